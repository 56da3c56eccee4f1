pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
    
    #[error("Setting {setting} has no option named {option}")]
    UnknownOption {
        setting: &'static str,
        option: String,
    },
}
