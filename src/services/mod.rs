pub mod recommendation;
pub mod storage;
