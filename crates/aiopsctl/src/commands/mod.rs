pub mod completion;
pub mod describe;
pub mod get;
pub mod run;
pub mod version;
