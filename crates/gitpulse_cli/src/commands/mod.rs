pub(crate) mod auth;
pub(crate) mod limits;
pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod repo;
pub(crate) mod shared;
pub(crate) mod status;
pub(crate) mod sync;
