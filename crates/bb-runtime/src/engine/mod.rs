include!("lifecycle.rs");
include!("stack.rs");
include!("step.rs");
include!("boundary.rs");
include!("notify.rs");
include!("visit_count.rs");
include!("tests.rs");
