pub mod catalogue;
pub mod error;
pub mod fonts;
pub mod intake;
pub mod model;
pub mod report;
pub mod scoring;
pub mod serial;
pub mod store;
