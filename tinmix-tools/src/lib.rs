pub mod id_vec;
pub mod signal;
