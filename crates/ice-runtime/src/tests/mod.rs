//! Test suites for communicator bootstrap.

pub(crate) mod support;
