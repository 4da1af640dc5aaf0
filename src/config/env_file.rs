use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 載入工作目錄（或上層）的 `.env`，檔案不存在時回傳 `Ok(None)`
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    skip_missing(dotenvy::dotenv())
}

pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    skip_missing(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn skip_missing(
    result: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
