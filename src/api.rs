pub mod authentication;
pub mod swagger_main;
#[cfg(test)]
pub mod test_util;
