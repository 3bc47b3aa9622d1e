//! Cyclic module interface
//!
//! The vehicle model and the course regulator are both cyclic modules: initialised once with
//! their parameters and the session, then stepped once per dynamics cycle, with every step
//! archived into the session.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;

// Internal imports
use crate::{
    archive::{ArchiveError, Archived},
    session::Session,
};

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State: Archived {
    /// Name used when logging about the module.
    const NAME: &'static str;

    /// Data required during initialisation
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for one cycle.
    type InputData;
    /// Data produced by one cycle.
    type OutputData;
    /// A report on the last cycle, written to the archives.
    type StatusReport;
    /// An error which can occur during a cycle.
    type ProcError;

    /// Load parameters and open the module's archives in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Step the module by one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Archive the last cycle.
    ///
    /// A module built without `init` has no archives and is skipped. Other archive failures are
    /// logged and not returned.
    ///
    /// Returns true if a record was written.
    fn archive(&mut self) -> bool {
        match self.write() {
            Ok(()) => true,
            Err(ArchiveError::NotInitialised) => false,
            Err(e) => {
                warn!("Could not archive {}: {}", Self::NAME, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::archive::Archiver;

    #[derive(Default)]
    struct Counter {
        count: u32,
        arch: Archiver,
    }

    #[derive(serde::Serialize)]
    struct Record {
        count: u32,
    }

    impl Archived for Counter {
        fn write(&mut self) -> Result<(), ArchiveError> {
            self.arch.serialise(Record { count: self.count })
        }
    }

    impl State for Counter {
        const NAME: &'static str = "Counter";

        type InitData = ();
        type InitError = ArchiveError;
        type InputData = u32;
        type OutputData = u32;
        type StatusReport = ();
        type ProcError = ();

        fn init(&mut self, _: (), session: &Session) -> Result<(), ArchiveError> {
            self.arch = Archiver::from_path(session, "counter.csv")?;
            Ok(())
        }

        fn proc(&mut self, step: &u32) -> Result<(u32, ()), ()> {
            self.count += step;
            Ok((self.count, ()))
        }
    }

    #[test]
    fn test_archive_after_init() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session {
            session_root: dir.path().to_path_buf(),
            arch_root: dir.path().join("arch"),
            log_file_path: dir.path().join("test.log"),
        };

        let mut c = Counter::default();

        // Not initialised, nothing to write
        c.proc(&1).unwrap();
        assert!(!c.archive());

        c.init((), &session).unwrap();
        c.proc(&2).unwrap();
        assert!(c.archive());

        let contents = std::fs::read_to_string(dir.path().join("arch/counter.csv")).unwrap();
        assert_eq!(contents, "count\n3\n");
    }
}
