#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use app_market_profiler::record::RecordStore;
use tempfile::{TempDir, tempdir};

/// Builds a store from string literals; the first row is the header.
pub fn store(header: &[&str], rows: &[&[&str]]) -> RecordStore {
    RecordStore::from_rows(
        header.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect::<Vec<_>>()),
    )
}

/// A trimmed Google Play export: 13 columns, one duplicate, one shifted row,
/// one non-English name and one paid app.
pub const GOOGLE_PLAY_SAMPLE: &str = "\
App,Category,Rating,Reviews,Size,Installs,Type,Price,Content Rating,Genres,Last Updated,Current Ver,Android Ver
Instagram,SOCIAL,4.5,66577313,Varies with device,\"1,000,000,000+\",Free,0,Teen,Social,\"July 31, 2018\",Varies with device,Varies with device
Coloring book moana,ART_AND_DESIGN,3.9,967,14M,\"500,000+\",Free,0,Everyone,Art & Design;Pretend Play,\"January 15, 2018\",2.0.0,4.0.3 and up
Instagram,SOCIAL,4.5,66577446,Varies with device,\"1,000,000,000+\",Free,0,Teen,Social,\"July 31, 2018\",Varies with device,Varies with device
Life Made WI-Fi Touchscreen Photo Frame,1.9,19,3.0M,\"1,000+\",Free,0,Everyone,,\"February 11, 2018\",1.0.19,4.0 and up
爱奇艺PPS -《欢乐颂2》电视剧热播,VIDEO_PLAYERS,4.3,1000,Varies with device,\"100,000+\",Free,0,Teen,Video Players & Editors,\"August 1, 2018\",1.0,4.0 and up
Minecraft,FAMILY,4.5,2376564,Varies with device,\"10,000,000+\",Paid,$6.99,Everyone 10+,Arcade;Action & Adventure,\"July 24, 2018\",1.5.2.1,Varies with device
Docs To Go™ Free Office Suite,BUSINESS,4.1,217730,Varies with device,\"50,000,000+\",Free,0,Everyone,Business,\"April 2, 2018\",Varies with device,Varies with device
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    /// Writes raw bytes, for inputs that are not UTF-8.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}
