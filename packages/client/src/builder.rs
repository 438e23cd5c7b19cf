//! # Builder
//!
//! Ties an [`EditSession`] to a page backend. Local edits go through the
//! session; this type adds the network operations around it.
//!
//! Every failure is also pushed to the session as a notice, and none of
//! them touch the in-memory tree: a failed save leaves the edits in place
//! for the next attempt.

use pagecraft_blocks::{BlockId, BlockKind, BlockRegistry};
use pagecraft_editor::{EditSession, Entitlement, Mutation, NoticeLevel, PageDocument};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::{CheckoutRequest, CopyRequest, PageApi, SnapshotRef};
use crate::checkout::price_to_cents;
use crate::error::{BuilderError, VersionError};
use crate::guard::InFlight;
use crate::versions::{Tier, VersionService};

pub struct Builder<A: PageApi> {
    api: A,
    registry: BlockRegistry,
    entitlement: Entitlement,
    tier: Tier,
    session: Option<EditSession>,
    uploads: InFlight,
}

impl<A: PageApi> Builder<A> {
    pub fn new(api: A, registry: BlockRegistry, entitlement: Entitlement, tier: Tier) -> Self {
        Self {
            api,
            registry,
            entitlement,
            tier,
            session: None,
            uploads: InFlight::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn session(&self) -> Result<&EditSession, BuilderError> {
        self.session.as_ref().ok_or(BuilderError::NotLoaded)
    }

    pub fn session_mut(&mut self) -> Result<&mut EditSession, BuilderError> {
        self.session.as_mut().ok_or(BuilderError::NotLoaded)
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads.is_busy()
    }

    /// Fetch the owner's page and start a fresh session on it
    pub async fn load(&mut self, owner: &str) -> Result<(), BuilderError> {
        let page = self.api.get_landing_page(owner).await?;
        info!(owner, page_id = %page.id, "Loaded page into builder");

        let document = PageDocument::new(page, self.registry.clone(), self.entitlement);
        self.session = Some(EditSession::new(owner, document));
        Ok(())
    }

    /// Apply a local edit; rejections become session notices
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, BuilderError> {
        Ok(self.session_mut()?.apply(mutation).is_some_and(|r| r.changed))
    }

    /// PUT the whole page. Concurrent saves resolve last-write-wins on the backend.
    pub async fn save_changes(&mut self) -> Result<(), BuilderError> {
        let page = self.session()?.document.page().clone();

        match self.api.put_landing_page(&page).await {
            Ok(()) => {
                let session = self.session_mut()?;
                session.document.mark_saved();
                session.notify(NoticeLevel::Success, "Changes saved");
                info!(page_id = %page.id, version = session.document.version(), "Saved page");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    pub async fn save_version(&mut self, name: &str, existing_id: Option<&str>) -> Result<SnapshotRef, BuilderError> {
        let (page_id, payload) = {
            let page = self.session()?.document.page();
            (page.id.clone(), page.content.clone())
        };

        let result = VersionService::new(&self.api, self.tier)
            .save(&page_id, name, payload, existing_id)
            .await;
        match result {
            Ok(saved) => {
                self.session_mut()?
                    .notify(NoticeLevel::Success, format!("Version \"{}\" saved", saved.name));
                Ok(saved)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    pub async fn versions(&mut self) -> Result<Vec<SnapshotRef>, BuilderError> {
        let page_id = self.session()?.document.page().id.clone();
        match VersionService::new(&self.api, self.tier).list(&page_id).await {
            Ok(versions) => Ok(versions),
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Overwrite the live page with a snapshot. Undo history is reset since
    /// it describes a tree that no longer exists.
    pub async fn apply_version(&mut self, version_id: &str) -> Result<(), BuilderError> {
        let page_id = self.session()?.document.page().id.clone();
        let result = VersionService::new(&self.api, self.tier)
            .apply(&page_id, version_id)
            .await;

        match result {
            Ok(payload) => {
                let session = self.session_mut()?;
                session.document.replace_content(payload);
                session.document.mark_saved();
                session.reset_history();
                session.notify(NoticeLevel::Success, "Version applied");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    pub async fn delete_version(&mut self, version_id: &str) -> Result<(), BuilderError> {
        let result = VersionService::new(&self.api, self.tier).delete(version_id).await;
        match result {
            Ok(()) => {
                self.session_mut()?.notify(NoticeLevel::Info, "Version deleted");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Ask the copy service for text and write it into `key` of a block
    pub async fn generate_copy(&mut self, block_id: &BlockId, key: &str, prompt: &str) -> Result<String, BuilderError> {
        let kind = self.block_kind(block_id)?;
        let request = CopyRequest {
            prompt: prompt.to_string(),
            block_type: kind,
        };

        let text = match self.api.generate_copy(&request).await {
            Ok(text) => text,
            Err(err) => return Err(self.fail(err.into())),
        };

        let applied = self.session_mut()?.apply(Mutation::SetField {
            block_id: block_id.clone(),
            key: key.to_string(),
            value: Value::String(text.clone()),
        });
        if applied.is_none() {
            return Err(BuilderError::FieldRejected {
                block_id: block_id.clone(),
                key: key.to_string(),
            });
        }
        Ok(text)
    }

    /// Start a checkout for a `stripe_checkout` block, returning the redirect URL
    pub async fn checkout(&mut self, block_id: &BlockId) -> Result<String, BuilderError> {
        let request = match self.checkout_request(block_id) {
            Ok(request) => request,
            Err(err) => return Err(self.fail(err)),
        };

        match self.api.create_checkout_session(&request).await {
            Ok(url) => {
                info!(page_id = %request.page_id, cents = request.price_cents, "Checkout session created");
                Ok(url)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    fn checkout_request(&self, block_id: &BlockId) -> Result<CheckoutRequest, BuilderError> {
        let document = &self.session()?.document;
        let block = document
            .tree()
            .find(block_id)
            .ok_or_else(|| BuilderError::BlockNotFound(block_id.clone()))?;
        if block.kind() != BlockKind::StripeCheckout {
            return Err(BuilderError::NotCheckout(block_id.clone()));
        }

        let product_ref = [block.text("pdfUrl"), block.text("productName")]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(block_id.as_str())
            .to_string();

        Ok(CheckoutRequest {
            page_id: document.page().id.clone(),
            seller_id: document.page().username.clone(),
            product_ref,
            price_cents: price_to_cents(block.text("price"))?,
        })
    }

    /// Upload a file. A second upload while one is running fails with `Busy`.
    pub async fn upload_asset(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, BuilderError> {
        let _token = self.uploads.try_start().ok_or(BuilderError::Busy)?;
        Ok(self.api.upload_asset(file_name, bytes).await?)
    }

    /// Upload a logo and point the page at it
    pub async fn upload_logo(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<String, BuilderError> {
        if self.session.is_none() {
            return Err(BuilderError::NotLoaded);
        }
        match self.upload_asset(file_name, bytes).await {
            Ok(url) => {
                self.session_mut()?.document.content_mut().logo_url = Some(url.clone());
                Ok(url)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn block_kind(&self, block_id: &BlockId) -> Result<BlockKind, BuilderError> {
        self.session()?
            .document
            .tree()
            .find(block_id)
            .map(|block| block.kind())
            .ok_or_else(|| BuilderError::BlockNotFound(block_id.clone()))
    }

    /// Report a failure as a notice and hand it back
    fn fail(&mut self, err: BuilderError) -> BuilderError {
        warn!(error = %err, "Builder operation failed");
        let level = match &err {
            BuilderError::Version(VersionError::CapReached { .. }) => NoticeLevel::Upgrade,
            BuilderError::Busy | BuilderError::InvalidPrice(_) => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        if let Some(session) = self.session.as_mut() {
            session.notify(level, err.to_string());
        }
        err
    }
}
