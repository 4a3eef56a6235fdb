use anyhow::Result;

use crate::host::MapHost;
use crate::{PositionLog, PositionRecord};

/// Owns everything recorded during one tracing session. Positions go in through `supply` as they
/// arrive; `complete` ends the session and hands back the full log.
pub struct TracingSession {
    log: PositionLog,
    done: bool,
}

impl TracingSession {
    pub fn new() -> Self {
        Self {
            log: PositionLog::new(),
            done: false,
        }
    }

    pub fn log(&self) -> &PositionLog {
        &self.log
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Records one position and asks the host for a redraw. Never waits on anything.
    pub fn supply(&mut self, rec: PositionRecord, host: &mut dyn MapHost) -> Result<()> {
        if self.done {
            bail!(
                "Session already finished; can't supply the position at {}",
                rec.timestamp_ms
            );
        }
        self.log.push(rec);
        host.request_redraw();
        Ok(())
    }

    /// Ends the session, returning every record supplied, including omitted ones. Only works
    /// once.
    pub fn complete(&mut self) -> Result<PositionLog> {
        if self.done {
            bail!("Session already finished");
        }
        self.done = true;
        info!(
            "Tracing session finished with {} positions ({} omitted)",
            self.log.len(),
            self.log.omitted_count()
        );
        Ok(std::mem::take(&mut self.log))
    }
}

impl Default for TracingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use geom::GPSBounds;

    use super::*;
    use crate::RecordingHost;

    fn rec(timestamp_ms: i64, omit: bool) -> PositionRecord {
        PositionRecord {
            latitude: 1.0,
            longitude: 2.0,
            heading: None,
            timestamp_ms,
            omit,
        }
    }

    #[test]
    fn returns_everything_supplied() {
        let mut host = RecordingHost::new(GPSBounds::new());
        let mut session = TracingSession::new();
        for i in 0..7 {
            session.supply(rec(i, i % 3 == 0), &mut host).unwrap();
        }
        assert_eq!(host.redraws_requested, 7);

        let log = session.complete().unwrap();
        assert_eq!(log.len(), 7);
        assert_eq!(log.omitted_count(), 3);
        let times: Vec<i64> = log.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(times, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn nothing_after_completion() {
        let mut host = RecordingHost::new(GPSBounds::new());
        let mut session = TracingSession::new();
        session.supply(rec(0, false), &mut host).unwrap();
        session.complete().unwrap();
        assert!(session.is_done());
        assert!(session.supply(rec(1, false), &mut host).is_err());
        assert!(session.complete().is_err());
        assert_eq!(host.redraws_requested, 1);
    }
}
