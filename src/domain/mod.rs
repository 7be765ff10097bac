pub mod list;
pub mod password;
pub mod task;
pub mod user;

#[cfg(test)]
pub mod test_util;
