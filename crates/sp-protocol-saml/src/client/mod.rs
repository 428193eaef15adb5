//! Client lifecycle.
//!
//! A [`Client`] drives login in three steps: redirect the browser to the
//! IdP, obtain credentials from the request the IdP sends back, and turn
//! those credentials into a user profile. [`Saml2Client`] is the SAML 2.0
//! Web Browser SSO implementation; it calls the [`ResponseValidator`]
//! when obtaining credentials.
//!
//! [`ResponseValidator`]: crate::validator::ResponseValidator

mod codec;
mod saml2;
mod web_context;

pub use codec::{DecodedResponse, SamlMessageCodec};
pub use saml2::{Saml2Client, Saml2Credentials, Saml2Profile, SAML2_REQUEST_ID_ATTRIBUTE};
pub use web_context::{InMemoryWebContext, SessionStore, WebContext};

use crate::error::SamlResult;

/// What the caller must send back to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpAction {
    /// Answer with a 302 to `location`.
    Redirect {
        /// Target URL.
        location: String,
    },
    /// Answer with an auto-submitting HTML form.
    PostForm {
        /// Where the form posts to.
        destination: String,
        /// The HTML page.
        html: String,
    },
}

/// An authentication mechanism.
pub trait Client: Send + Sync {
    /// Credentials extracted from the callback request.
    type Credentials;
    /// The profile built from credentials.
    type Profile;

    /// Name of the client.
    fn name(&self) -> &str;

    /// Starts login at the identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound request cannot be built.
    fn redirect(&self, ctx: &dyn WebContext) -> SamlResult<HttpAction>;

    /// Extracts and validates credentials from the callback request.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::RequiresHttpAction`](crate::SamlError::RequiresHttpAction)
    /// when the request carries no credentials, or the validation failure.
    fn get_credentials(&self, ctx: &dyn WebContext) -> SamlResult<Self::Credentials>;

    /// Builds the user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be built.
    fn get_user_profile(
        &self,
        credentials: Self::Credentials,
        ctx: &dyn WebContext,
    ) -> SamlResult<Self::Profile>;
}
