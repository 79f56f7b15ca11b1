/// Launch configuration for a headless Chrome instance
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),

    /// Custom user agent
    pub user_agent: Option<String>,

    /// Disable image loading for performance
    pub disable_images: bool,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            disable_images: true,
            chrome_flags: vec![
                "--disable-dev-shm-usage".to_string(),
                "--no-sandbox".to_string(),
            ],
        }
    }
}

impl BrowserConfig {
    /// Full list of Chrome command-line arguments for this configuration
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = self.chrome_flags.clone();
        if self.disable_images {
            args.push("--blink-settings=imagesEnabled=false".to_string());
        }
        if let Some(ua) = &self.user_agent {
            args.push(format!("--user-agent={}", ua));
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_size, (1920, 1080));
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_launch_args() {
        let config = BrowserConfig::default();
        let args = config.launch_args();
        assert!(args.iter().any(|a| a == "--disable-dev-shm-usage"));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla")));
        assert!(args.iter().any(|a| a.contains("imagesEnabled=false")));
    }

    #[test]
    fn test_images_enabled() {
        let config = BrowserConfig {
            disable_images: false,
            user_agent: None,
            ..BrowserConfig::default()
        };
        let args = config.launch_args();
        assert!(!args.iter().any(|a| a.contains("imagesEnabled")));
        assert!(!args.iter().any(|a| a.starts_with("--user-agent=")));
    }
}
