// Guarded lifecycle operations - every stage or brief mutation in the system
// goes through here, so brief status and project stage cannot drift apart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::access::{self, Actor};
use crate::error::EngineError;
use crate::lifecycle::state_machine::LifecycleEvent;
use crate::lifecycle::types::{Brief, BriefStatus, Project};
use crate::notify::{AudienceSelector, NotificationEvent, NotificationFanout, NotificationKind};
use crate::store::{BriefStore, ProjectStore};

pub struct LifecycleEngine {
    projects: Arc<dyn ProjectStore>,
    briefs: Arc<dyn BriefStore>,
    fanout: NotificationFanout,
    /// Per-project locks: each operation's read-check-write sequence runs as
    /// one critical section, so concurrent approve+reject on the same brief
    /// produce exactly one winner.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LifecycleEngine {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        briefs: Arc<dyn BriefStore>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            projects,
            briefs,
            fanout,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn project_lock(&self, project_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(project_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_project(&self, project_id: Uuid) -> Result<Project, EngineError> {
        self.projects
            .get_project(project_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("project {project_id}")))
    }

    /// Fan-out failures are isolated: logged and counted, never allowed to
    /// fail the transition that triggered them.
    async fn notify(&self, event: NotificationEvent, audience: AudienceSelector) {
        match self.fanout.fanout(event, audience).await {
            Ok(report) if report.failures.is_empty() => {}
            Ok(report) => warn!(
                created = report.created,
                failed = report.failures.len(),
                "notification fan-out completed with per-recipient failures"
            ),
            Err(err) => warn!(error = %err, "notification fan-out could not resolve its audience"),
        }
    }

    /// Open a project for a contact entering onboarding.
    pub async fn open_project(
        &self,
        owner_id: Uuid,
        actor: &Actor,
    ) -> Result<Project, EngineError> {
        if !access::is_staff(actor) {
            return Err(EngineError::unauthorized("open project"));
        }

        let project = Project::new(owner_id);
        self.projects.insert_project(project.clone()).await?;
        info!(project_id = %project.id, owner_id = %owner_id, "project opened");

        self.notify(
            NotificationEvent::new(
                NotificationKind::OnboardingUpdate,
                Some(project.id),
                "Welcome aboard",
                "Your project has been opened. A brief will follow shortly.",
            ),
            AudienceSelector::User(owner_id),
        )
        .await;

        Ok(project)
    }

    /// Append a fresh brief version for the project, always with status
    /// `Sent`. Version numbers strictly increase and are never reused, even
    /// after a rejection.
    pub async fn submit_brief(
        &self,
        project_id: Uuid,
        content: String,
        actor: &Actor,
    ) -> Result<Brief, EngineError> {
        if !access::can_submit_brief(actor) {
            return Err(EngineError::unauthorized("submit brief"));
        }

        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let project = self.load_project(project_id).await?;
        let next_version = self
            .briefs
            .latest_brief(project_id)
            .await?
            .map(|brief| brief.version + 1)
            .unwrap_or(1);

        let brief = Brief::new(project_id, next_version, content);
        self.briefs.append_brief(brief.clone()).await?;
        info!(
            project_id = %project_id,
            version = next_version,
            "brief submitted"
        );

        self.notify(
            NotificationEvent::new(
                NotificationKind::OnboardingUpdate,
                Some(project_id),
                "Your brief is ready",
                "A new project brief is waiting for your approval.",
            )
            .with_metadata(json!({ "version": next_version })),
            AudienceSelector::User(project.owner_id),
        )
        .await;

        Ok(brief)
    }

    /// Approve the latest `Sent` brief, moving the project into `Design`.
    pub async fn approve_brief(
        &self,
        project_id: Uuid,
        actor: &Actor,
    ) -> Result<Project, EngineError> {
        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let mut project = self.load_project(project_id).await?;
        if !access::can_review_brief(actor, project.owner_id) {
            return Err(EngineError::unauthorized("approve brief"));
        }

        let mut brief = self
            .briefs
            .latest_brief(project_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("brief for project {project_id}")))?;
        if brief.status != BriefStatus::Sent {
            return Err(EngineError::invalid_state(format!(
                "brief v{} is {:?}, only the latest sent version can be approved",
                brief.version, brief.status
            )));
        }

        let next_stage = project.stage.apply(LifecycleEvent::BriefApproved)?;

        brief.status = BriefStatus::Approved;
        self.briefs.update_brief(&brief).await?;

        project.stage = next_stage;
        if let Err(err) = self.projects.update_project(&project).await {
            // Roll the brief back to Sent so a retry of the whole transition
            // can pass its guard again.
            brief.status = BriefStatus::Sent;
            if let Err(rollback_err) = self.briefs.update_brief(&brief).await {
                error!(
                    project_id = %project_id,
                    version = brief.version,
                    error = %rollback_err,
                    "stage write failed and brief rollback also failed"
                );
            }
            return Err(EngineError::Dependency(err));
        }

        info!(
            project_id = %project_id,
            version = brief.version,
            stage = %project.stage,
            "brief approved"
        );

        self.notify(
            NotificationEvent::new(
                NotificationKind::Success,
                Some(project_id),
                "Brief approved",
                format!("Brief v{} was approved; design work can begin.", brief.version),
            )
            .with_metadata(json!({ "version": brief.version })),
            AudienceSelector::AllStaff,
        )
        .await;

        Ok(project)
    }

    /// Reject the latest `Sent` brief, storing the client's comment. The
    /// project stage is deliberately left untouched.
    pub async fn reject_brief(
        &self,
        project_id: Uuid,
        comment: String,
        actor: &Actor,
    ) -> Result<Brief, EngineError> {
        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let project = self.load_project(project_id).await?;
        if !access::can_review_brief(actor, project.owner_id) {
            return Err(EngineError::unauthorized("reject brief"));
        }

        let mut brief = self
            .briefs
            .latest_brief(project_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("brief for project {project_id}")))?;
        if brief.status != BriefStatus::Sent {
            return Err(EngineError::invalid_state(format!(
                "brief v{} is {:?}, only the latest sent version can be rejected",
                brief.version, brief.status
            )));
        }

        brief.status = BriefStatus::Rejected;
        brief.client_comment = Some(comment);
        self.briefs.update_brief(&brief).await?;

        info!(
            project_id = %project_id,
            version = brief.version,
            "brief rejected, stage unchanged"
        );

        self.notify(
            NotificationEvent::new(
                NotificationKind::System,
                Some(project_id),
                "Brief rejected",
                format!("Brief v{} was rejected; see the client comment.", brief.version),
            )
            .with_metadata(json!({ "version": brief.version })),
            AudienceSelector::AllStaff,
        )
        .await;

        Ok(brief)
    }

    /// Staff advancement: design work is done, build begins.
    pub async fn start_build(
        &self,
        project_id: Uuid,
        actor: &Actor,
    ) -> Result<Project, EngineError> {
        self.advance(
            project_id,
            actor,
            LifecycleEvent::BuildStarted,
            "Build started",
            "Design was completed and build work has begun.",
        )
        .await
    }

    /// Staff advancement: build output goes to the client for review.
    pub async fn submit_for_review(
        &self,
        project_id: Uuid,
        actor: &Actor,
    ) -> Result<Project, EngineError> {
        self.advance(
            project_id,
            actor,
            LifecycleEvent::ReviewRequested,
            "Ready for review",
            "The latest build is ready for your review.",
        )
        .await
    }

    async fn advance(
        &self,
        project_id: Uuid,
        actor: &Actor,
        event: LifecycleEvent,
        title: &str,
        body: &str,
    ) -> Result<Project, EngineError> {
        if !access::can_advance_stage(actor) {
            return Err(EngineError::unauthorized("advance stage"));
        }

        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let mut project = self.load_project(project_id).await?;
        project.stage = project.stage.apply(event)?;
        self.projects.update_project(&project).await?;

        info!(project_id = %project_id, stage = %project.stage, "stage advanced");

        self.notify(
            NotificationEvent::new(
                NotificationKind::OnboardingUpdate,
                Some(project_id),
                title,
                body,
            ),
            AudienceSelector::User(project.owner_id),
        )
        .await;

        Ok(project)
    }

    /// Owner sends a project under review back to build, with their feedback
    /// captured as a fresh brief version. All staff are notified.
    pub async fn request_modification(
        &self,
        project_id: Uuid,
        feedback: String,
        actor: &Actor,
    ) -> Result<Brief, EngineError> {
        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let mut project = self.load_project(project_id).await?;
        if !access::can_review_brief(actor, project.owner_id) {
            return Err(EngineError::unauthorized("request modification"));
        }

        let next_stage = project.stage.apply(LifecycleEvent::ModificationRequested)?;

        let next_version = self
            .briefs
            .latest_brief(project_id)
            .await?
            .map(|brief| brief.version + 1)
            .unwrap_or(1);
        let brief = Brief::new(project_id, next_version, feedback);
        // Append before the stage write: a retry after a failed stage write
        // appends another version, which the numbering tolerates.
        self.briefs.append_brief(brief.clone()).await?;

        project.stage = next_stage;
        self.projects.update_project(&project).await?;

        info!(
            project_id = %project_id,
            version = next_version,
            stage = %project.stage,
            "modification requested"
        );

        self.notify(
            NotificationEvent::new(
                NotificationKind::System,
                Some(project_id),
                "Modification requested",
                format!(
                    "The client sent the project back to build; feedback is in brief v{next_version}."
                ),
            )
            .with_metadata(json!({ "version": next_version })),
            AudienceSelector::AllStaff,
        )
        .await;

        Ok(brief)
    }

    /// Owner signs off on the delivery. Idempotent at the state level: a
    /// second call on a delivered project succeeds without rewriting
    /// `delivered_at` and without a second fan-out.
    pub async fn validate_delivery(
        &self,
        project_id: Uuid,
        actor: &Actor,
    ) -> Result<Project, EngineError> {
        let lock = self.project_lock(project_id).await;
        let _guard = lock.lock().await;

        let mut project = self.load_project(project_id).await?;
        if !access::can_review_brief(actor, project.owner_id) {
            return Err(EngineError::unauthorized("validate delivery"));
        }

        if project.stage.is_terminal() {
            info!(project_id = %project_id, "delivery already validated");
            return Ok(project);
        }

        project.stage = project.stage.apply(LifecycleEvent::DeliveryValidated)?;
        project.delivered_at = Some(Utc::now());
        self.projects.update_project(&project).await?;

        info!(
            project_id = %project_id,
            delivered_at = ?project.delivered_at,
            "delivery validated"
        );

        self.notify(
            NotificationEvent::new(
                NotificationKind::Success,
                Some(project_id),
                "Delivery validated",
                "The client validated the delivery. Project complete.",
            ),
            AudienceSelector::AllStaff,
        )
        .await;

        Ok(project)
    }
}
