//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use sp_core::SpConfig;
use sp_protocol_saml::client::{DecodedResponse, SamlMessageCodec};
use sp_protocol_saml::decryption::{DecryptionError, Decrypter};
use sp_protocol_saml::signature::{
    SignatureAlgorithm, SignatureTrustEngine, TrustCriteria, TrustEngineError, XmlSignature,
};
use sp_protocol_saml::{
    Assertion, Attribute, AttributeStatement, AuthnContextClass, AuthnRequest, AuthnStatement,
    Conditions, EncryptedAssertion, EncryptedData, IdpSsoDescriptor, NameId, Response,
    ResponseValidator, SamlError, SamlMessageContext, SamlMetadataContext, SamlPeerEntityContext,
    SamlResult, SpSsoDescriptor, Subject, SubjectConfirmation, SubjectConfirmationData,
};

pub const IDP_ENTITY_ID: &str = "https://idp.example.com/metadata";
pub const IDP_SSO_URL: &str = "https://idp.example.com/sso";
pub const SP_ENTITY_ID: &str = "https://sp.example.com/metadata";
pub const SP_ACS_URL: &str = "https://sp.example.com/callback";

/// Signature value the fake engine trusts.
pub const TRUSTED: &str = "dHJ1c3RlZA==";
/// Signature value the fake engine rejects.
pub const FORGED: &str = "Zm9yZ2Vk";

/// Initializes tracing once for the test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sp_protocol_saml=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Trust engine that trusts fixed signature values for one peer.
pub struct FakeTrustEngine {
    peer: String,
    trusted: HashSet<String>,
    evaluations: AtomicUsize,
}

impl FakeTrustEngine {
    pub fn new() -> Self {
        Self {
            peer: IDP_ENTITY_ID.to_string(),
            trusted: HashSet::from([TRUSTED.to_string()]),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Number of signatures evaluated so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl SignatureTrustEngine for FakeTrustEngine {
    fn evaluate(
        &self,
        signature: &XmlSignature,
        criteria: &TrustCriteria<'_>,
    ) -> Result<bool, TrustEngineError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        if criteria.peer_entity_id != Some(self.peer.as_str()) {
            return Err(TrustEngineError::NoCredentials(
                criteria.peer_entity_id.unwrap_or("<none>").to_string(),
            ));
        }
        Ok(self.trusted.contains(&signature.signature_value))
    }
}

/// Decrypter backed by a table of known ciphertexts.
#[derive(Default)]
pub struct FakeDecrypter {
    assertions: HashMap<String, Assertion>,
    attributes: HashMap<String, Attribute>,
    name_ids: HashMap<String, NameId>,
}

impl FakeDecrypter {
    /// Encrypts `assertion` under a new ciphertext handle.
    pub fn seal_assertion(&mut self, assertion: Assertion) -> EncryptedAssertion {
        let handle = format!("enc-assertion-{}", assertion.id);
        self.assertions.insert(handle.clone(), assertion);
        EncryptedAssertion::new(EncryptedData::new(handle))
    }

    pub fn seal_attribute(&mut self, attribute: Attribute) -> EncryptedData {
        let handle = format!("enc-attribute-{}", attribute.name);
        self.attributes.insert(handle.clone(), attribute);
        EncryptedData::new(handle)
    }

    pub fn seal_name_id(&mut self, name_id: NameId) -> EncryptedData {
        let handle = format!("enc-nameid-{}", name_id.value);
        self.name_ids.insert(handle.clone(), name_id);
        EncryptedData::new(handle)
    }
}

fn unknown(encrypted: &EncryptedData) -> DecryptionError {
    DecryptionError::InvalidCiphertext(encrypted.cipher_data.cipher_value.clone())
}

impl Decrypter for FakeDecrypter {
    fn decrypt_assertion(
        &self,
        encrypted: &EncryptedAssertion,
    ) -> Result<Assertion, DecryptionError> {
        let data = &encrypted.encrypted_data;
        self.assertions
            .get(&data.cipher_data.cipher_value)
            .cloned()
            .ok_or_else(|| unknown(data))
    }

    fn decrypt_attribute(&self, encrypted: &EncryptedData) -> Result<Attribute, DecryptionError> {
        self.attributes
            .get(&encrypted.cipher_data.cipher_value)
            .cloned()
            .ok_or_else(|| unknown(encrypted))
    }

    fn decrypt_name_id(&self, encrypted: &EncryptedData) -> Result<NameId, DecryptionError> {
        self.name_ids
            .get(&encrypted.cipher_data.cipher_value)
            .cloned()
            .ok_or_else(|| unknown(encrypted))
    }
}

/// Codec that maps XML documents to pre-registered Responses.
#[derive(Default)]
pub struct FakeCodec {
    responses: Mutex<HashMap<String, DecodedResponse>>,
}

impl FakeCodec {
    /// Registers `response` and returns the XML that decodes to it.
    pub fn register(&self, response: Response, peer_authenticated: bool) -> String {
        let xml = format!(r#"<samlp:Response ID="{}"/>"#, response.id);
        self.responses.lock().insert(
            xml.clone(),
            DecodedResponse {
                response,
                peer_authenticated,
            },
        );
        xml
    }
}

impl SamlMessageCodec for FakeCodec {
    fn encode_authn_request(&self, request: &AuthnRequest) -> SamlResult<String> {
        Ok(format!(
            r#"<samlp:AuthnRequest ID="{}" Destination="{}"/>"#,
            request.id,
            request.destination.as_deref().unwrap_or_default()
        ))
    }

    fn decode_response(&self, xml: &str) -> SamlResult<DecodedResponse> {
        self.responses
            .lock()
            .get(xml)
            .cloned()
            .ok_or_else(|| SamlError::InvalidResponse("unknown document".into()))
    }
}

pub fn config() -> SpConfig {
    SpConfig::new(SP_ENTITY_ID, SP_ACS_URL).with_clock_skew_secs(0)
}

pub fn sp_descriptor() -> SpSsoDescriptor {
    SpSsoDescriptor::new(SP_ENTITY_ID).with_acs(SP_ACS_URL)
}

pub fn idp_descriptor() -> IdpSsoDescriptor {
    IdpSsoDescriptor::new(IDP_ENTITY_ID).with_sso_url(IDP_SSO_URL)
}

/// Validator with the fake trust engine and the given decrypter.
pub fn validator_with(
    config: SpConfig,
    engine: Arc<FakeTrustEngine>,
    decrypter: Option<FakeDecrypter>,
) -> anyhow::Result<ResponseValidator> {
    init_tracing();
    let mut builder = ResponseValidator::builder(config).trust_engine(engine);
    if let Some(decrypter) = decrypter {
        builder = builder.decrypter(Arc::new(decrypter));
    }
    Ok(builder.build()?)
}

pub fn trusted_signature(element_id: &str) -> XmlSignature {
    XmlSignature::new(SignatureAlgorithm::RsaSha256, element_id, TRUSTED)
}

/// A trusted signature whose reference URI is empty.
pub fn enveloping_signature() -> XmlSignature {
    XmlSignature {
        reference_uri: String::new(),
        ..trusted_signature("")
    }
}

pub fn forged_signature(element_id: &str) -> XmlSignature {
    XmlSignature::new(SignatureAlgorithm::RsaSha256, element_id, FORGED)
}

/// A fully valid, unsigned assertion answering `request_id`.
pub fn assertion(id: &str, now: DateTime<Utc>, request_id: Option<&str>) -> Assertion {
    let until = now + Duration::minutes(5);
    let data = match request_id {
        Some(request_id) => SubjectConfirmationData::for_request(request_id, SP_ACS_URL, until),
        None => SubjectConfirmationData::unsolicited(SP_ACS_URL, until),
    };
    Assertion::with_id(id, IDP_ENTITY_ID)
        .issued_at(now)
        .with_subject(
            Subject::new(NameId::email("jdoe@example.com"))
                .with_confirmation(SubjectConfirmation::bearer().with_data(data)),
        )
        .with_conditions(Conditions::between(now, until).with_audience(SP_ENTITY_ID))
        .with_authn_statement(
            AuthnStatement::new(now, AuthnContextClass::PasswordProtectedTransport)
                .with_session_index("_session1"),
        )
        .with_attribute_statement(
            AttributeStatement::new()
                .with_attribute(Attribute::single("mail", "jdoe@example.com"))
                .with_attribute(Attribute::multi(
                    "groups",
                    vec!["staff".to_string(), "admins".to_string()],
                )),
        )
}

/// A valid, signed assertion.
pub fn signed_assertion(id: &str, now: DateTime<Utc>) -> Assertion {
    assertion(id, now, None).with_signature(trusted_signature(id))
}

/// A success Response carrying `assertions`.
pub fn response(now: DateTime<Utc>, assertions: Vec<Assertion>) -> Response {
    assertions
        .into_iter()
        .fold(
            Response::builder(IDP_ENTITY_ID)
                .issue_instant(now)
                .destination(SP_ACS_URL),
            sp_protocol_saml::ResponseBuilder::assertion,
        )
        .build()
}

/// Message context with metadata for both sides and the given peer state.
pub fn context(response: Response, peer: Option<SamlPeerEntityContext>) -> SamlMessageContext {
    let ctx = SamlMessageContext::new(
        response,
        SamlMetadataContext::for_sp(sp_descriptor()),
        SamlMetadataContext::for_idp(idp_descriptor()),
    );
    match peer {
        Some(peer) => ctx.with_peer_entity(peer),
        None => ctx,
    }
}
