//! Editing session for one proposal template.
//!
//! An [`EditSession`] is the single owner of everything the builder edits:
//! template metadata, the element sequence, the live form preview and the
//! current selection. Saving and publishing borrow the session mutably, so
//! one session can never have two writes in flight. A failed write leaves
//! the in-memory state exactly as it was.

use crate::elements::{ElementConfig, ElementType, ProposalElement};
use crate::error::CoreError;
use crate::form::FormState;
use crate::persistence::{StoredTemplate, TemplateBackend};
use crate::pricing::{self, PricingResult};
use crate::store::{ElementStore, MoveDirection};
use crate::template::{
    self, CoverageWarning, TemplateConfig, TemplateDocument, DEFAULT_NAME, DEFAULT_SLUG,
};
use crate::types::DbId;

#[derive(Debug, Clone)]
pub struct EditSession {
    id: Option<DbId>,
    name: String,
    slug: String,
    description: Option<String>,
    theme_config: serde_json::Value,
    store: ElementStore,
    form: FormState,
    selected: Option<String>,
    is_published: bool,
    published_url: Option<String>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    /// A fresh, never-saved template.
    pub fn new() -> Self {
        Self::from_document(None, TemplateDocument {
            name: DEFAULT_NAME.to_string(),
            slug: DEFAULT_SLUG.to_string(),
            description: None,
            config_json: TemplateConfig::default(),
        })
    }

    fn from_document(id: Option<DbId>, document: TemplateDocument) -> Self {
        let TemplateConfig {
            elements,
            theme_config,
        } = document.config_json;
        let store = ElementStore::from_elements(elements);
        let form = FormState::seeded(store.elements());
        Self {
            id,
            name: document.name,
            slug: document.slug,
            description: document.description,
            theme_config,
            store,
            form,
            selected: None,
            is_published: false,
            published_url: None,
        }
    }

    fn from_stored(stored: StoredTemplate) -> Self {
        let mut session = Self::from_document(Some(stored.id), stored.document);
        session.is_published = stored.is_published;
        session.published_url = stored.published_url;
        session
    }

    /// Load a persisted template. Elements are ordered by their stored
    /// `order` field.
    pub async fn load<B>(backend: &B, id: DbId) -> Result<Self, CoreError>
    where
        B: TemplateBackend + ?Sized,
    {
        let stored = backend.get(id).await?;
        tracing::debug!(template_id = id, "Loaded proposal template");
        Ok(Self::from_stored(stored))
    }

    // -- metadata ----------------------------------------------------------

    pub fn id(&self) -> Option<DbId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the template. While the slug still mirrors the name it is
    /// re-derived; a slug set by hand is kept.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.slug == template::generate_slug(&self.name) {
            self.slug = template::generate_slug(&name);
        }
        self.name = name;
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = slug.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn is_published(&self) -> bool {
        self.is_published
    }

    pub fn published_url(&self) -> Option<&str> {
        self.published_url.as_deref()
    }

    // -- elements ----------------------------------------------------------

    pub fn elements(&self) -> &[ProposalElement] {
        self.store.elements()
    }

    pub fn selected_element_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_element(&self) -> Option<&ProposalElement> {
        self.selected.as_deref().and_then(|id| self.store.get(id))
    }

    /// Select an element for editing. Unknown ids leave the selection alone.
    pub fn select(&mut self, id: &str) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Append an element and select it.
    pub fn add_element(&mut self, element_type: ElementType) -> String {
        let id = self.store.add_element(element_type);
        self.selected = Some(id.clone());
        id
    }

    pub fn move_element(&mut self, id: &str, direction: MoveDirection) -> bool {
        self.store.move_element(id, direction)
    }

    pub fn delete_element(&mut self, id: &str) -> bool {
        let removed = self.store.delete_element(id);
        if removed && self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        removed
    }

    pub fn update_element_config(
        &mut self,
        id: &str,
        config: ElementConfig,
    ) -> Result<bool, CoreError> {
        config.validate()?;
        self.store.update_element_config(id, config)
    }

    // -- preview -----------------------------------------------------------

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    /// Price the current form values against the current elements.
    pub fn evaluate(&self) -> PricingResult {
        pricing::evaluate(self.store.elements(), self.form.values())
    }

    pub fn validate_references(&self) -> Result<(), CoreError> {
        template::validate_references(self.store.elements())
    }

    // -- persistence -------------------------------------------------------

    /// The document that `save` would write.
    pub fn document(&self) -> TemplateDocument {
        TemplateDocument {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            config_json: TemplateConfig {
                elements: self.store.elements().to_vec(),
                theme_config: self.theme_config.clone(),
            },
        }
    }

    /// Create on first save, update afterwards. Returns tier coverage
    /// warnings for the saved elements.
    pub async fn save<B>(&mut self, backend: &B) -> Result<Vec<CoverageWarning>, CoreError>
    where
        B: TemplateBackend + ?Sized,
    {
        let document = self.document();
        document.validate()?;

        let stored = match self.id {
            Some(id) => backend.update(id, &document).await?,
            None => backend.create(&document).await?,
        };
        tracing::info!(template_id = stored.id, slug = %document.slug, "Proposal template saved");

        self.id = Some(stored.id);
        self.is_published = stored.is_published;
        Ok(template::audit_tier_coverage(document.elements()))
    }

    /// Publish the last saved version. The template must have been saved at
    /// least once.
    pub async fn publish<B>(&mut self, backend: &B) -> Result<&str, CoreError>
    where
        B: TemplateBackend + ?Sized,
    {
        let id = self.id.ok_or(CoreError::TemplateNotSaved)?;
        let published = backend.publish(id).await?;
        tracing::info!(template_id = id, url = %published.published_url, "Proposal template published");

        self.is_published = true;
        Ok(self.published_url.insert(published.published_url).as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::elements::{HeroConfig, PricingTier, PricingTiersConfig};
    use crate::money::Money;
    use crate::persistence::memory::{MemoryBackend, BASE_URL};

    #[test]
    fn new_session_defaults() {
        let session = EditSession::new();
        assert_eq!(session.id(), None);
        assert_eq!(session.name(), "Untitled Template");
        assert_eq!(session.slug(), "untitled-template");
        assert!(session.elements().is_empty());
        assert!(!session.is_published());
    }

    #[test]
    fn renaming_derives_slug_until_set_by_hand() {
        let mut session = EditSession::new();
        session.set_name("Wedding Film 2026");
        assert_eq!(session.slug(), "wedding-film-2026");

        session.set_name("Wedding Film");
        assert_eq!(session.slug(), "wedding-film");

        session.set_slug("summer-weddings");
        session.set_name("Wedding Film Deluxe");
        assert_eq!(session.name(), "Wedding Film Deluxe");
        assert_eq!(session.slug(), "summer-weddings");
    }

    #[tokio::test]
    async fn publish_before_save_fails_then_succeeds() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        session.set_slug("spring-gala");
        session.add_element(ElementType::Hero);

        assert_matches!(
            session.publish(&backend).await,
            Err(CoreError::TemplateNotSaved)
        );

        session.save(&backend).await.unwrap();
        let url = session.publish(&backend).await.unwrap().to_string();
        assert!(url.contains("spring-gala"));
        assert_eq!(url, format!("{BASE_URL}/proposals/preview/spring-gala"));
        assert!(session.is_published());
        assert_eq!(session.published_url(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn first_save_creates_later_saves_update() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        session.save(&backend).await.unwrap();
        let id = session.id().unwrap();

        session.set_name("Corporate Event");
        session.add_element(ElementType::Divider);
        session.save(&backend).await.unwrap();

        assert_eq!(session.id(), Some(id));
        assert_eq!(backend.len(), 1);
        let stored = backend.stored(id).unwrap();
        assert_eq!(stored.document.name, "Corporate Event");
        assert_eq!(stored.document.elements().len(), 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_edits() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        session.add_element(ElementType::Hero);
        backend.fail(true);

        assert_matches!(session.save(&backend).await, Err(CoreError::Persistence(_)));
        assert_eq!(session.id(), None);
        assert_eq!(session.elements().len(), 1);

        backend.fail(false);
        session.save(&backend).await.unwrap();
        assert!(session.id().is_some());
    }

    #[tokio::test]
    async fn dangling_reference_blocks_save() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        session.add_element(ElementType::PricingTiers);

        assert_matches!(
            session.save(&backend).await,
            Err(CoreError::DanglingReference { reference, .. }) if reference == "quantity"
        );
        assert_eq!(backend.len(), 0);
    }

    #[tokio::test]
    async fn invalid_slug_blocks_save() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        session.set_slug("Not A Slug");
        assert_matches!(session.save(&backend).await, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn save_reports_tier_gaps() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        session.add_element(ElementType::NumberInput);
        let tiers_id = session.add_element(ElementType::PricingTiers);
        session
            .update_element_config(
                &tiers_id,
                ElementConfig::PricingTiers(PricingTiersConfig {
                    tiers: vec![PricingTier {
                        label: "Small".into(),
                        min_qty: 1,
                        max_qty: Some(10),
                        price_per_unit: Money::from_major(100),
                    }],
                    ..Default::default()
                }),
            )
            .unwrap();

        let warnings = session.save(&backend).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!((warnings[0].from, warnings[0].to), (11, Some(1000)));
    }

    #[tokio::test]
    async fn load_restores_sequence_in_order() {
        let backend = MemoryBackend::new();
        let mut session = EditSession::new();
        let hero = session.add_element(ElementType::Hero);
        let divider = session.add_element(ElementType::Divider);
        session.move_element(&divider, MoveDirection::Up);
        session.save(&backend).await.unwrap();

        let loaded = EditSession::load(&backend, session.id().unwrap()).await.unwrap();
        let ids: Vec<&str> = loaded.elements().iter().map(|el| el.id()).collect();
        assert_eq!(ids, vec![divider.as_str(), hero.as_str()]);
        assert_eq!(loaded.selected_element_id(), None);
    }

    #[tokio::test]
    async fn load_missing_template_is_not_found() {
        let backend = MemoryBackend::new();
        assert_matches!(
            EditSession::load(&backend, 42).await,
            Err(CoreError::NotFound { id: 42, .. })
        );
    }

    #[test]
    fn add_selects_and_delete_clears_selection() {
        let mut session = EditSession::new();
        let hero = session.add_element(ElementType::Hero);
        assert_eq!(session.selected_element_id(), Some(hero.as_str()));

        let divider = session.add_element(ElementType::Divider);
        assert!(session.delete_element(&hero));
        assert_eq!(session.selected_element_id(), Some(divider.as_str()));

        assert!(session.delete_element(&divider));
        assert_eq!(session.selected_element_id(), None);
        assert!(session.elements().is_empty());
    }

    #[test]
    fn update_config_validates_payload() {
        let mut session = EditSession::new();
        let id = session.add_element(ElementType::Hero);
        let hero = HeroConfig {
            title: "Wedding Films".into(),
            ..Default::default()
        };
        assert!(session
            .update_element_config(&id, ElementConfig::Hero(hero))
            .unwrap());

        let bad = ElementConfig::PricingTiers(PricingTiersConfig {
            based_on: " ".into(),
            ..Default::default()
        });
        assert_matches!(
            session.update_element_config(&id, bad),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn creation_scenario_prices_preview() {
        let mut session = EditSession::new();
        session.add_element(ElementType::Hero);
        session.add_element(ElementType::NumberInput);
        session.add_element(ElementType::PricingTiers);
        session.add_element(ElementType::SubmitButton);
        session.form_mut().set("quantity", 5.0);

        let result = session.evaluate();
        assert_eq!(result.subtotal, Money::from_major(500));
        assert!(session.validate_references().is_ok());
    }
}
