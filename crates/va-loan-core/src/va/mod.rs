pub mod dti;
pub mod funding_fee;
