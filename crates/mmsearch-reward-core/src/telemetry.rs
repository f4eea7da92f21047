//! Log output for programs that embed the scoring engine.
//!
//! Scores are the program output, so they own stdout: `mmsearch-reward score
//! ep.json > reward.txt` must capture nothing but the number. Everything
//! emitted through `tracing` is therefore written to stderr. Batch runs that
//! feed a log collector switch the lines to JSON, where the `episode_id` of
//! the enclosing [`EpisodeSpan`](crate::obs::EpisodeSpan) travels with every
//! event.

use std::io;

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// `RUST_LOG` when it is set and parses, otherwise `level`.
pub fn log_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Formatting layer that writes log lines to `writer`, one JSON object per
/// line when `json` is set.
pub fn log_layer<S, W>(json: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_target(false).with_writer(writer);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Install the process-wide subscriber: [`log_filter`] over a stderr
/// [`log_layer`].
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    tracing_subscriber::registry()
        .with(log_filter(level))
        .with(log_layer(json, io::stderr))
        .try_init()
        .ok();
}

/// Run `f` under a JSON subscriber local to this thread and return what it
/// logged, one parsed record per line.
#[cfg(test)]
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<serde_json::Value>) {
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(log_layer(true, move || writer.clone()));
    let out = tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    let records = String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (out, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContractViolation;
    use crate::obs::{emit_contract_violation, EpisodeSpan};

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::DEBUG);
    }

    #[test]
    fn test_json_lines_carry_episode_id() {
        let ((), records) = capture_logs(|| {
            let _span = EpisodeSpan::enter("fvqa_train_0007");
            emit_contract_violation(&ContractViolation::EmptyTranscript);
        });
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "WARN");
        assert_eq!(records[0]["fields"]["event"], "episode.contract_violation");
        assert_eq!(records[0]["span"]["episode_id"], "fvqa_train_0007");
    }
}
