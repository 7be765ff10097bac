use crate::external_connections::ExternalConnectivity;

/// A shared named list. Lists are seeded at bootstrap and shared by every
/// user; only the items inside them are per-user.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TaskList {
    pub id: i32,
    pub title: String,
}

pub mod driven_ports {
    use super::*;

    pub trait ListReader {
        /// Every list title, sorted, for the list picker
        async fn all_titles(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<String>, anyhow::Error>;
        /// Looks a list up by its exact title
        async fn id_by_title(
            &self,
            title: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<i32>, anyhow::Error>;
    }
}
