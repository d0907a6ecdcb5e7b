/// Connection details of the remote document store behind the file proxy.
#[derive(Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    /// Path prefix under the endpoint where asset files live.
    pub asset_path: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("asset_path", &self.asset_path)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl StorageConfig {
    /// Full remote URL of an object stored at `relative` under the asset path.
    /// Each segment of `relative` is percent-encoded.
    #[must_use]
    pub fn object_url(&self, relative: &str) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        let prefix = self.asset_path.trim_matches('/');
        let relative = relative
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if prefix.is_empty() {
            format!("{endpoint}/{relative}")
        } else {
            format!("{endpoint}/{prefix}/{relative}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str, asset_path: &str) -> StorageConfig {
        StorageConfig {
            endpoint: endpoint.to_string(),
            asset_path: asset_path.to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
        }
    }

    #[test]
    fn test_object_url_joins_segments() {
        let c = config("https://cloud.example.com/", "/remote.php/dav/files/assets/");
        assert_eq!(
            c.object_url("asset/photo.jpg"),
            "https://cloud.example.com/remote.php/dav/files/assets/asset/photo.jpg"
        );
        let c = config("https://cloud.example.com", "");
        assert_eq!(c.object_url("/a.pdf"), "https://cloud.example.com/a.pdf");
    }

    #[test]
    fn test_object_url_encodes_segments() {
        let c = config("https://cloud.example.com", "dav/assets");
        assert_eq!(
            c.object_url("asset/report#1.pdf"),
            "https://cloud.example.com/dav/assets/asset/report%231.pdf"
        );
        assert_eq!(
            c.object_url("asset/a?b 100%.pdf"),
            "https://cloud.example.com/dav/assets/asset/a%3Fb%20100%25.pdf"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let c = config("https://cloud.example.com", "x");
        assert!(!format!("{c:?}").contains("\"p\""));
    }
}
