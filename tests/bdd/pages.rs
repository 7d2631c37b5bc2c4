//! Page objects for the application under test.
//!
//! Locators are plain constructor-supplied descriptors; nothing is resolved
//! until an interaction actually needs the element.

use webharness::error::Error;
use webharness::{Locator, Page};

/// The login page.
pub struct LoginPage {
    page: Page,
}

impl LoginPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    fn username() -> Locator {
        Locator::xpath("//*[@id='user-phone-no']")
    }

    fn password() -> Locator {
        Locator::xpath("//*[@type='password']")
    }

    fn login_button() -> Locator {
        Locator::xpath("//form//button[@type='submit']")
    }

    fn error_message() -> Locator {
        Locator::css("div.error-message")
    }

    fn remember_me() -> Locator {
        Locator::id("rememberMe")
    }

    /// Navigate to the login page and wait for it to finish loading.
    pub async fn open(&self, base_url: &str) -> Result<(), Error> {
        self.page.navigate_to(base_url).await?;
        self.page.wait_for_page_load().await?;
        Ok(())
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), Error> {
        self.page.clear_and_type(&Self::username(), username).await?;
        self.page.clear_and_type(&Self::password(), password).await?;
        self.page.click(&Self::login_button()).await?;
        Ok(())
    }

    pub async fn error_shown(&self) -> Result<bool, Error> {
        Ok(self.page.is_displayed(&Self::error_message()).await?)
    }

    pub async fn remember_me_checked(&self) -> Result<bool, Error> {
        Ok(self.page.is_selected(&Self::remember_me()).await?)
    }
}
