pub(crate) mod cancel;
pub(crate) mod frames;
pub(crate) mod runner;
