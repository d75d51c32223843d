pub mod hash_table;
pub mod ranking_heap;
