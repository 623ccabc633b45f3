pub mod convert;
pub mod coordinates;
pub mod error;
pub mod events;
pub mod graph;
pub mod info;
pub mod lockfile;
pub mod reconcile;
pub mod repository;
pub mod resolve;

pub use convert::LockFileConverter;
pub use coordinates::Coordinates;
pub use error::MvnlockError;
pub use info::DependencyInfo;
pub use lockfile::{LockFile, NebulaFormat, V2Format};

pub type Result<T> = std::result::Result<T, MvnlockError>;
