pub mod mortgage;
pub mod policy;
pub mod va;
