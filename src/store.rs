use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::*;

use crate::record::FeedbackRecord;
use crate::Error;

/// Header of the feedback file, in column order.
pub const HEADER: [&str; 6] = ["Name", "Gender", "Age", "Email", "Feedback", "Sentiment"];

/// Append only CSV file of feedback records.
pub struct FeedbackStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn append(&self, record: &FeedbackRecord) -> Result<(), Error> {
        trace!("Locking store: append");
        let _guard = self.write_lock.lock().map_err(|_| Error::StoreLocked)?;
        trace!("Locked store: append");

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        let len = file.metadata()?.len();
        let fresh = len == 0;

        // A last row without a line break would swallow the new one
        if !fresh {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                debug!("Closing unterminated last row of {}", self.path.display());
                file.write_all(b"\n")?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(&HEADER)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        if fresh {
            info!("Started feedback file {}", self.path.display());
        }
        debug!("Stored feedback from {:?}", record.name);
        Ok(())
    }

    /// Every stored record in submission order. A store that was never
    /// written to reads as empty.
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>, Error> {
        if !self.exists() {
            return Ok(vec![]);
        }
        let mut reader = csv::Reader::from_reader(File::open(&self.path)?);
        let records = reader
            .deserialize()
            .collect::<Result<Vec<FeedbackRecord>, csv::Error>>()?;
        trace!("Read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}
