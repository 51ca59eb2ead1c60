pub mod file_util;
pub mod test_utils;

pub fn generate_random_uuid() -> String {
    use uuid::Uuid;
    Uuid::new_v4().to_string()
}
