//! The Gateway: the host-facing entry point of Policy Gate.
//!
//! The Gateway owns the ABE primitive, the ledger store and the
//! configuration, and exposes two surfaces over them:
//!
//! - typed async methods returning [`Result`]
//! - [`Gateway::invoke`], a string-dispatched call surface for ledger hosts
//!   that returns a [`Response`] and never an error. Decryption denials
//!   become empty successes there, so a caller cannot tell a wrong
//!   attribute from a missing key.

use std::fmt;
use std::sync::Arc;

use policygate_access::{
    AccessController, AccessError, AuditLog, PolicyEncryptor, ProvenanceError, ProvenanceGate,
    TransactionStatus,
};
use policygate_core::{AbeScheme, AuditRecord, CodecError, KeyCodec, Policy, TransactionRef};
use policygate_store::LedgerStore;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

/// Payload returned by `appendTrans` on success.
pub const APPEND_SUCCESS: &[u8] = b"success";

/// Outcome of a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Success(Vec<u8>),
    Error(String),
}

impl Response {
    pub fn success(payload: impl Into<Vec<u8>>) -> Self {
        Response::Success(payload.into())
    }

    /// A success carrying nothing, which is also how a denial looks.
    pub fn empty() -> Self {
        Response::Success(Vec::new())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Success(payload) => Some(payload),
            Response::Error(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Success(_) => None,
            Response::Error(message) => Some(message),
        }
    }
}

/// Named operations accepted by [`Gateway::invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `beforeEncrypt(from, to, transactionId)`
    BeforeEncrypt,
    /// `decrypt(ciphertextHex, objectId, actorId, labels...)`
    Decrypt,
    /// `appendTrans(from, to, transactionId)`
    AppendTrans,
    /// `getAudit(objectId)`
    GetAudit,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::BeforeEncrypt,
        Operation::Decrypt,
        Operation::AppendTrans,
        Operation::GetAudit,
    ];

    /// Look up an operation by its wire name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::BeforeEncrypt => "beforeEncrypt",
            Operation::Decrypt => "decrypt",
            Operation::AppendTrans => "appendTrans",
            Operation::GetAudit => "getAudit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Freshly generated authority keys in their hex transport form.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub public_key_hex: String,
    pub master_key_hex: String,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_key_hex", &self.public_key_hex)
            .field("master_key_hex", &"<redacted>")
            .finish()
    }
}

/// The Policy Gate handle.
pub struct Gateway<S, L> {
    scheme: Arc<S>,
    store: Arc<L>,
    config: GatewayConfig,
}

impl<S: AbeScheme, L: LedgerStore> Gateway<S, L> {
    /// Create a new gateway.
    pub fn new(scheme: S, store: L, config: GatewayConfig) -> Self {
        Self::with_shared(Arc::new(scheme), Arc::new(store), config)
    }

    /// Create a gateway over handles shared with other components.
    pub fn with_shared(scheme: Arc<S>, store: Arc<L>, config: GatewayConfig) -> Self {
        Self {
            scheme,
            store,
            config,
        }
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate an authority key pair. Run once, off-ledger, by the
    /// authority; the output is what [`init`](Self::init) expects.
    pub fn setup(scheme: &S) -> Result<KeyMaterial> {
        let (public_key, master_key) = scheme.generate_master_keys()?;
        let encode_err =
            |e: CodecError| GatewayError::Configuration(format!("cannot encode keys: {}", e));
        Ok(KeyMaterial {
            public_key_hex: KeyCodec::<S>::to_hex(
                &KeyCodec::<S>::encode_public_key(&public_key).map_err(encode_err)?,
            ),
            master_key_hex: KeyCodec::<S>::to_hex(
                &KeyCodec::<S>::encode_master_key(&master_key).map_err(encode_err)?,
            ),
        })
    }

    /// Install the authority keys: `[publicKeyHex, masterKeyHex]`.
    ///
    /// Both keys are checked to decode as their kind before anything is
    /// written.
    pub async fn init<T: AsRef<str> + Sync>(&self, args: &[T]) -> Result<()> {
        let [public_hex, master_hex] = args else {
            return Err(GatewayError::InvalidArguments(format!(
                "init expects a public key and a master key, got {} arguments",
                args.len()
            )));
        };

        let public_key = KeyCodec::<S>::from_hex(public_hex.as_ref())
            .map_err(|e| GatewayError::Configuration(format!("public key: {}", e)))?;
        KeyCodec::<S>::decode_public_key(&public_key)
            .map_err(|e| GatewayError::Configuration(format!("public key: {}", e)))?;

        let master_key = KeyCodec::<S>::from_hex(master_hex.as_ref())
            .map_err(|e| GatewayError::Configuration(format!("master key: {}", e)))?;
        KeyCodec::<S>::decode_master_key(&master_key)
            .map_err(|e| GatewayError::Configuration(format!("master key: {}", e)))?;

        let keys = &self.config.keys;
        self.store.put_state(&keys.public_key, &public_key).await?;
        self.store.put_state(&keys.master_key, &master_key).await?;
        tracing::info!("authority keys installed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Typed operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record a transaction, enabling public key release for it.
    pub async fn append_transaction(&self, tx: &TransactionRef) -> Result<()> {
        Ok(self.gate().record_transaction(tx).await?)
    }

    pub async fn transaction_status(&self, tx: &TransactionRef) -> Result<TransactionStatus> {
        Ok(self.gate().check_transaction(tx).await?)
    }

    /// The stored public key, hex-encoded, if `tx` was recorded.
    pub async fn before_encrypt(&self, tx: &TransactionRef) -> Result<String> {
        let bytes = self.gate().release_public_key(tx).await?;
        Ok(KeyCodec::<S>::to_hex(&bytes))
    }

    /// Decrypt a hex ciphertext for `actor_id` holding `labels`, recording
    /// the attempt under `object_id`.
    pub async fn decrypt<T: AsRef<str> + Sync>(
        &self,
        ciphertext_hex: &str,
        object_id: &str,
        actor_id: &str,
        labels: &[T],
    ) -> Result<Vec<u8>> {
        Ok(self
            .controller()
            .decrypt_hex(ciphertext_hex, object_id, actor_id, labels)
            .await?)
    }

    /// The object's audit log as stored (JSON), empty if none.
    pub async fn audit(&self, object_id: &str) -> Result<Vec<u8>> {
        Ok(self.audit_log().raw(object_id).await?)
    }

    pub async fn audit_records(&self, object_id: &str) -> Result<Vec<AuditRecord>> {
        Ok(self.audit_log().records(object_id).await?)
    }

    /// Encrypt for holders of `department_label`, for a recorded transaction.
    pub async fn encrypt(
        &self,
        plaintext: &[u8],
        department_label: &str,
        tx: &TransactionRef,
    ) -> Result<Vec<u8>> {
        Ok(self.encryptor().encrypt(plaintext, department_label, tx).await?)
    }

    pub async fn encrypt_with_policy(
        &self,
        plaintext: &[u8],
        policy: &Policy,
        tx: &TransactionRef,
    ) -> Result<Vec<u8>> {
        Ok(self
            .encryptor()
            .encrypt_with_policy(plaintext, policy, tx)
            .await?)
    }

    /// Encrypt locally with a key previously returned by
    /// [`before_encrypt`](Self::before_encrypt).
    pub fn encrypt_with_released_key(
        &self,
        public_key_hex: &str,
        plaintext: &[u8],
        policy: &Policy,
    ) -> Result<Vec<u8>> {
        Ok(self
            .encryptor()
            .encrypt_with_released_key(public_key_hex, plaintext, policy)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Dispatch a named call from the ledger host.
    pub async fn invoke<T: AsRef<str> + Sync>(&self, function: &str, params: &[T]) -> Response {
        let Some(operation) = Operation::from_name(function) else {
            tracing::debug!(function, "unknown function");
            return Response::error("not supported function");
        };
        tracing::debug!(%operation, params = params.len(), "invoke");

        match operation {
            Operation::BeforeEncrypt => self.invoke_before_encrypt(params).await,
            Operation::Decrypt => self.invoke_decrypt(params).await,
            Operation::AppendTrans => self.invoke_append_trans(params).await,
            Operation::GetAudit => self.invoke_get_audit(params).await,
        }
    }

    async fn invoke_before_encrypt<T: AsRef<str> + Sync>(&self, params: &[T]) -> Response {
        let Some(tx) = transaction_from(params) else {
            return Response::error("not sufficient parameters");
        };
        match self.before_encrypt(&tx).await {
            Ok(hex) => Response::success(hex),
            Err(GatewayError::Provenance(
                ProvenanceError::NoSuchTransaction(_) | ProvenanceError::InvalidTransaction(_),
            )) => Response::error("no such transaction"),
            Err(GatewayError::Provenance(ProvenanceError::PublicKeyUnavailable(_))) => {
                Response::error("fail to get public key")
            }
            Err(e) => Response::error(e.to_string()),
        }
    }

    async fn invoke_decrypt<T: AsRef<str> + Sync>(&self, params: &[T]) -> Response {
        let [ciphertext, object_id, actor_id, labels @ ..] = params else {
            return Response::empty();
        };
        match self
            .decrypt(ciphertext.as_ref(), object_id.as_ref(), actor_id.as_ref(), labels)
            .await
        {
            Ok(plaintext) => Response::success(plaintext),
            Err(GatewayError::Access(AccessError::Denied)) => Response::empty(),
            Err(e) => {
                tracing::warn!(object_id = object_id.as_ref(), error = %e, "decrypt not audited");
                Response::error(e.to_string())
            }
        }
    }

    async fn invoke_append_trans<T: AsRef<str> + Sync>(&self, params: &[T]) -> Response {
        let Some(tx) = transaction_from(params) else {
            return Response::error("not sufficient parameters");
        };
        match self.append_transaction(&tx).await {
            Ok(()) => Response::success(APPEND_SUCCESS),
            Err(e) => Response::error(e.to_string()),
        }
    }

    async fn invoke_get_audit<T: AsRef<str> + Sync>(&self, params: &[T]) -> Response {
        let [object_id] = params else {
            return Response::error("need one file id");
        };
        match self.audit(object_id.as_ref()).await {
            Ok(raw) => Response::success(raw),
            Err(e) => Response::error(e.to_string()),
        }
    }

    fn gate(&self) -> ProvenanceGate<'_, S, L> {
        ProvenanceGate::new(self.store.as_ref(), &self.config.keys)
    }

    fn audit_log(&self) -> AuditLog<'_, L> {
        AuditLog::new(self.store.as_ref(), &self.config.keys)
    }

    fn controller(&self) -> AccessController<'_, S, L> {
        AccessController::new(self.scheme.as_ref(), self.store.as_ref(), &self.config.keys)
            .with_max_attributes(self.config.max_attributes)
    }

    fn encryptor(&self) -> PolicyEncryptor<'_, S, L> {
        PolicyEncryptor::new(self.scheme.as_ref(), self.store.as_ref(), &self.config.keys)
    }
}

/// The first three parameters as a transaction; extra parameters are ignored.
fn transaction_from<T: AsRef<str>>(params: &[T]) -> Option<TransactionRef> {
    match params {
        [from, to, tx, ..] => Some(TransactionRef::new(from.as_ref(), to.as_ref(), tx.as_ref())),
        _ => None,
    }
}
