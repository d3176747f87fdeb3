pub mod replay;
pub mod row_sum;
pub mod slice;
pub mod tables;
