pub mod analyzers;
pub mod error;
pub mod normalize;
pub mod output;
pub mod records;
pub mod report;
pub mod table;
