mod invocations;

pub(crate) use invocations::*;
