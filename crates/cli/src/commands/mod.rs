pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod dump;
pub(crate) mod lookup;
