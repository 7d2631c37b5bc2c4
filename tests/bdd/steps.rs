//! Step definitions for the login feature.

use cucumber::{given, then, when};
use webharness::reporting;

use super::pages::LoginPage;
use super::world::HarnessWorld;

#[given("the user navigates to the login page")]
async fn navigate_to_login(world: &mut HarnessWorld) {
    let base_url = world.required_property("baseUrl");
    let login = LoginPage::new(world.page().await);
    // First load is the flakiest step of a UI run; spend the configured
    // retry budget on it.
    webharness::retry::with_retries(world.settings.retry_count, || login.open(&base_url))
        .await
        .expect("login page did not open");
    reporting::info("user is on the login page");
}

#[when("the user signs in with valid credentials")]
async fn sign_in_with_valid_credentials(world: &mut HarnessWorld) {
    let username = world.required_property("loginUser");
    let password = world.required_property("loginPassword");
    world.store.record("loginUser", username.clone());

    let login = LoginPage::new(world.page().await);
    login
        .sign_in(&username, &password)
        .await
        .expect("sign-in failed");
}

#[then("the login error message is not shown")]
async fn login_error_is_not_shown(world: &mut HarnessWorld) {
    let login = LoginPage::new(world.page().await);
    let shown = login.error_shown().await.expect("error probe failed");
    assert!(!shown, "login error message is visible");
}

#[then("the remember me checkbox is unchecked")]
async fn remember_me_is_unchecked(world: &mut HarnessWorld) {
    let login = LoginPage::new(world.page().await);
    let checked = login
        .remember_me_checked()
        .await
        .expect("checkbox probe failed");
    assert!(!checked, "remember me is already checked");
}
