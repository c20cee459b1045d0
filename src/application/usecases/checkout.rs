use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::{interfaces::payment_gateway::PaymentGateway, usecases::billing_mode::BillingModeSource},
    domain::{
        entities::organizations::OrganizationEntity,
        repositories::{
            organizations::OrganizationRepository, plans::PlanRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::{
            enums::{billing_intervals::BillingInterval, billing_modes::BillingMode},
            plans::PlanDto,
            subscriptions::{
                CurrentBillingDto, ProrationBehavior, RedirectUrlResponse, SwitchPlanResponse,
            },
        },
    },
};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("organization not found")]
    OrganizationNotFound,
    #[error("plan has no {0} price configured")]
    MissingPrice(BillingInterval),
    #[error("no active subscription, subscribe first via checkout")]
    NoActiveSubscription,
    #[error("no billing account, subscribe first")]
    NoBillingCustomer,
    #[error("payment provider request failed")]
    Provider(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BillingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BillingError::PlanNotFound | BillingError::OrganizationNotFound => {
                StatusCode::NOT_FOUND
            }
            BillingError::MissingPrice(_)
            | BillingError::NoActiveSubscription
            | BillingError::NoBillingCustomer => StatusCode::BAD_REQUEST,
            BillingError::Provider(_) => StatusCode::BAD_GATEWAY,
            BillingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type BillingResult<T> = std::result::Result<T, BillingError>;

pub struct CheckoutUseCase<O, P, S, G, M>
where
    O: OrganizationRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
    M: BillingModeSource + 'static,
{
    organization_repo: Arc<O>,
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    payment_gateway: Arc<G>,
    billing_mode: Arc<M>,
}

impl<O, P, S, G, M> CheckoutUseCase<O, P, S, G, M>
where
    O: OrganizationRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    G: PaymentGateway + 'static,
    M: BillingModeSource + 'static,
{
    pub fn new(
        organization_repo: Arc<O>,
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        payment_gateway: Arc<G>,
        billing_mode: Arc<M>,
    ) -> Self {
        Self {
            organization_repo,
            plan_repo,
            subscription_repo,
            payment_gateway,
            billing_mode,
        }
    }

    pub async fn list_plans(&self) -> BillingResult<Vec<PlanDto>> {
        let plans = self.plan_repo.list_active_plans().await.map_err(|err| {
            error!(db_error = ?err, "billing: failed to list plans");
            BillingError::Internal(err)
        })?;

        Ok(plans.into_iter().map(PlanDto::from).collect())
    }

    pub async fn current_billing(&self, organization_id: Uuid) -> BillingResult<CurrentBillingDto> {
        let organization = self.load_organization(organization_id).await?;

        let active = self
            .subscription_repo
            .find_active_for_organization(organization_id)
            .await
            .map_err(|err| {
                error!(%organization_id, db_error = ?err, "billing: failed to load subscription");
                BillingError::Internal(err)
            })?;

        Ok(CurrentBillingDto {
            organization_id,
            plan: organization.plan,
            trial_ends_at: organization.trial_ends_at,
            has_billing_account: organization.stripe_customer_id.is_some(),
            subscription: active.map(Into::into),
        })
    }

    /// Resolves the plan price before touching the provider, then reuses or
    /// creates the organization's Stripe customer and opens a checkout session.
    pub async fn start_checkout(
        &self,
        organization_id: Uuid,
        email: &str,
        plan_id: Uuid,
        interval: BillingInterval,
    ) -> BillingResult<RedirectUrlResponse> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "billing: failed to load plan");
                BillingError::Internal(err)
            })?
            .filter(|plan| plan.is_active)
            .ok_or_else(|| {
                warn!(%organization_id, %plan_id, "billing: checkout for unknown plan");
                BillingError::PlanNotFound
            })?;

        let price_id = plan
            .stripe_price_for(interval)
            .map(str::to_string)
            .ok_or_else(|| {
                let err = BillingError::MissingPrice(interval);
                warn!(
                    %organization_id,
                    plan = %plan.slug,
                    interval = %interval,
                    status = err.status_code().as_u16(),
                    "billing: plan has no price for interval"
                );
                err
            })?;

        let organization = self.load_organization(organization_id).await?;
        let mode = self.current_mode().await?;
        let customer_id = self.ensure_customer(&organization, email, mode).await?;

        let metadata = HashMap::from([
            ("organization_id".to_string(), organization_id.to_string()),
            ("plan_id".to_string(), plan.id.to_string()),
        ]);

        let url = self
            .payment_gateway
            .create_checkout_session(mode, &customer_id, &price_id, metadata)
            .await
            .map_err(|err| {
                error!(
                    %organization_id,
                    plan = %plan.slug,
                    mode = %mode,
                    error = ?err,
                    "billing: failed to create checkout session"
                );
                BillingError::Provider(err)
            })?;

        info!(
            %organization_id,
            plan = %plan.slug,
            interval = %interval,
            mode = %mode,
            "billing: checkout session created"
        );
        Ok(RedirectUrlResponse { url })
    }

    pub async fn switch_plan(
        &self,
        organization_id: Uuid,
        plan_id: Uuid,
        interval: BillingInterval,
    ) -> BillingResult<SwitchPlanResponse> {
        let current = self
            .subscription_repo
            .find_active_for_organization(organization_id)
            .await
            .map_err(|err| {
                error!(%organization_id, db_error = ?err, "billing: failed to load subscription");
                BillingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BillingError::NoActiveSubscription;
                warn!(
                    %organization_id,
                    status = err.status_code().as_u16(),
                    "billing: switch requested without active subscription"
                );
                err
            })?;

        let target = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "billing: failed to load plan");
                BillingError::Internal(err)
            })?
            .filter(|plan| plan.is_active)
            .ok_or(BillingError::PlanNotFound)?;

        let price_id = target
            .stripe_price_for(interval)
            .map(str::to_string)
            .ok_or(BillingError::MissingPrice(interval))?;

        let upgraded = target.price_for(interval) > current.plan.price_for(interval);
        let proration = if upgraded {
            ProrationBehavior::AlwaysInvoice
        } else {
            ProrationBehavior::None
        };

        let mode = self.current_mode().await?;
        let stripe_subscription_id = current.subscription.stripe_subscription_id.as_str();

        self.payment_gateway
            .change_subscription_price(mode, stripe_subscription_id, &price_id, proration)
            .await
            .map_err(|err| {
                error!(
                    %organization_id,
                    subscription_id = stripe_subscription_id,
                    target = %target.slug,
                    error = ?err,
                    "billing: failed to change subscription price"
                );
                BillingError::Provider(err)
            })?;

        // Provisional until customer.subscription.updated arrives.
        self.subscription_repo
            .set_plan(current.subscription.id, target.id)
            .await
            .map_err(|err| {
                error!(%organization_id, db_error = ?err, "billing: failed to store switched plan");
                BillingError::Internal(err)
            })?;
        self.organization_repo
            .set_plan(organization_id, &target.slug)
            .await
            .map_err(|err| {
                error!(%organization_id, db_error = ?err, "billing: failed to update organization plan");
                BillingError::Internal(err)
            })?;

        info!(
            %organization_id,
            from = %current.plan.slug,
            to = %target.slug,
            proration = proration.as_str(),
            "billing: plan switched"
        );
        Ok(SwitchPlanResponse {
            plan: target.slug,
            upgraded,
        })
    }

    pub async fn open_billing_portal(
        &self,
        organization_id: Uuid,
    ) -> BillingResult<RedirectUrlResponse> {
        let organization = self.load_organization(organization_id).await?;
        let customer_id = organization
            .stripe_customer_id
            .ok_or(BillingError::NoBillingCustomer)?;

        let mode = self.current_mode().await?;
        let url = self
            .payment_gateway
            .create_portal_session(mode, &customer_id)
            .await
            .map_err(|err| {
                error!(%organization_id, error = ?err, "billing: failed to create portal session");
                BillingError::Provider(err)
            })?;

        Ok(RedirectUrlResponse { url })
    }

    async fn ensure_customer(
        &self,
        organization: &OrganizationEntity,
        email: &str,
        mode: BillingMode,
    ) -> BillingResult<String> {
        if let Some(existing) = organization.stripe_customer_id.as_ref() {
            return Ok(existing.clone());
        }

        let customer_id = self
            .payment_gateway
            .create_customer(mode, email, &organization.name, organization.id)
            .await
            .map_err(|err| {
                error!(
                    organization_id = %organization.id,
                    error = ?err,
                    "billing: failed to create stripe customer"
                );
                BillingError::Provider(err)
            })?;

        self.organization_repo
            .set_stripe_customer_id(organization.id, &customer_id)
            .await
            .map_err(|err| {
                error!(
                    organization_id = %organization.id,
                    db_error = ?err,
                    "billing: failed to store stripe customer id"
                );
                BillingError::Internal(err)
            })?;

        info!(organization_id = %organization.id, mode = %mode, "billing: stripe customer created");
        Ok(customer_id)
    }

    async fn load_organization(&self, organization_id: Uuid) -> BillingResult<OrganizationEntity> {
        self.organization_repo
            .find_by_id(organization_id)
            .await
            .map_err(|err| {
                error!(%organization_id, db_error = ?err, "billing: failed to load organization");
                BillingError::Internal(err)
            })?
            .ok_or(BillingError::OrganizationNotFound)
    }

    async fn current_mode(&self) -> BillingResult<BillingMode> {
        self.billing_mode.current_mode().await.map_err(|err| {
            error!(error = ?err, "billing: failed to resolve billing mode");
            BillingError::Internal(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::{
            interfaces::payment_gateway::MockPaymentGateway,
            usecases::billing_mode::MockBillingModeSource,
        },
        domain::{
            entities::{plans::PlanEntity, subscriptions::SubscriptionEntity},
            repositories::{
                organizations::MockOrganizationRepository, plans::MockPlanRepository,
                subscriptions::MockSubscriptionRepository,
            },
            value_objects::subscriptions::ActiveSubscription,
        },
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    type TestUseCase = CheckoutUseCase<
        MockOrganizationRepository,
        MockPlanRepository,
        MockSubscriptionRepository,
        MockPaymentGateway,
        MockBillingModeSource,
    >;

    fn build(
        organization_repo: MockOrganizationRepository,
        plan_repo: MockPlanRepository,
        subscription_repo: MockSubscriptionRepository,
        gateway: MockPaymentGateway,
    ) -> TestUseCase {
        let mut billing_mode = MockBillingModeSource::new();
        billing_mode
            .expect_current_mode()
            .returning(|| Ok(BillingMode::Live));

        CheckoutUseCase::new(
            Arc::new(organization_repo),
            Arc::new(plan_repo),
            Arc::new(subscription_repo),
            Arc::new(gateway),
            Arc::new(billing_mode),
        )
    }

    fn organization(id: Uuid, customer: Option<&str>) -> OrganizationEntity {
        let now = Utc::now();
        OrganizationEntity {
            id,
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            is_active: true,
            plan: "pro".to_string(),
            trial_ends_at: Some(now),
            stripe_customer_id: customer.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    fn plan(id: Uuid, slug: &str, monthly: i64, monthly_price: Option<&str>) -> PlanEntity {
        PlanEntity {
            id,
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            price_monthly: monthly,
            price_yearly: monthly * 10,
            features: vec!["Unlimited boards".to_string()],
            stripe_price_monthly: monthly_price.map(str::to_string),
            stripe_price_yearly: None,
            is_active: true,
            sort_order: 0,
        }
    }

    fn active_on(organization_id: Uuid, current: PlanEntity) -> ActiveSubscription {
        let now = Utc::now();
        ActiveSubscription {
            subscription: SubscriptionEntity {
                id: Uuid::new_v4(),
                organization_id,
                plan_id: current.id,
                stripe_subscription_id: "sub_1".to_string(),
                stripe_customer_id: Some("cus_1".to_string()),
                status: "active".to_string(),
                current_period_start: Some(now),
                current_period_end: None,
                cancel_at_period_end: false,
                created_at: now,
                updated_at: now,
            },
            plan: current,
        }
    }

    #[tokio::test]
    async fn missing_interval_price_never_reaches_the_provider() {
        let plan_id = Uuid::new_v4();
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .with(eq(plan_id))
            .returning(|id| Ok(Some(plan(id, "starter", 900, Some("price_starter_m")))));

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_customer().never();
        gateway.expect_create_checkout_session().never();

        let usecase = build(
            MockOrganizationRepository::new(),
            plan_repo,
            MockSubscriptionRepository::new(),
            gateway,
        );

        let result = usecase
            .start_checkout(Uuid::new_v4(), "owner@acme.test", plan_id, BillingInterval::Yearly)
            .await;

        assert!(matches!(
            result,
            Err(BillingError::MissingPrice(BillingInterval::Yearly))
        ));
    }

    #[tokio::test]
    async fn checkout_creates_and_stores_customer_once() {
        let organization_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();

        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(organization(id, None))));
        organization_repo
            .expect_set_stripe_customer_id()
            .with(eq(organization_id), eq("cus_new"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(plan(id, "starter", 900, Some("price_starter_m")))));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_customer()
            .withf(move |mode, email, name, id| {
                *mode == BillingMode::Live
                    && email == "owner@acme.test"
                    && name == "Acme"
                    && *id == organization_id
            })
            .times(1)
            .returning(|_, _, _, _| Ok("cus_new".to_string()));
        gateway
            .expect_create_checkout_session()
            .withf(move |mode, customer, price, metadata| {
                *mode == BillingMode::Live
                    && customer == "cus_new"
                    && price == "price_starter_m"
                    && metadata.get("organization_id") == Some(&organization_id.to_string())
                    && metadata.get("plan_id") == Some(&plan_id.to_string())
            })
            .times(1)
            .returning(|_, _, _, _| Ok("https://checkout.stripe.com/c/cs_1".to_string()));

        let usecase = build(
            organization_repo,
            plan_repo,
            MockSubscriptionRepository::new(),
            gateway,
        );

        let response = usecase
            .start_checkout(organization_id, "owner@acme.test", plan_id, BillingInterval::Monthly)
            .await
            .unwrap();

        assert_eq!(response.url, "https://checkout.stripe.com/c/cs_1");
    }

    #[tokio::test]
    async fn checkout_reuses_existing_customer() {
        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(organization(id, Some("cus_existing")))));
        organization_repo.expect_set_stripe_customer_id().never();

        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(plan(id, "pro", 1900, Some("price_pro_m")))));

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_customer().never();
        gateway
            .expect_create_checkout_session()
            .withf(|_, customer, _, _| customer == "cus_existing")
            .times(1)
            .returning(|_, _, _, _| Ok("https://checkout.stripe.com/c/cs_2".to_string()));

        let usecase = build(
            organization_repo,
            plan_repo,
            MockSubscriptionRepository::new(),
            gateway,
        );

        usecase
            .start_checkout(Uuid::new_v4(), "owner@acme.test", Uuid::new_v4(), BillingInterval::Monthly)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn switch_without_active_subscription_is_rejected_before_plan_lookup() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_active_for_organization()
            .returning(|_| Ok(None));
        let mut plan_repo = MockPlanRepository::new();
        plan_repo.expect_find_by_id().never();
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_change_subscription_price().never();

        let usecase = build(
            MockOrganizationRepository::new(),
            plan_repo,
            subscription_repo,
            gateway,
        );

        let result = usecase
            .switch_plan(Uuid::new_v4(), Uuid::new_v4(), BillingInterval::Monthly)
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, BillingError::NoActiveSubscription));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upgrade_prorates_and_updates_plan_optimistically() {
        let organization_id = Uuid::new_v4();
        let starter = plan(Uuid::new_v4(), "starter", 900, Some("price_starter_m"));
        let pro_id = Uuid::new_v4();
        let active = active_on(organization_id, starter);
        let local_subscription_id = active.subscription.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_active_for_organization()
            .with(eq(organization_id))
            .returning(move |_| Ok(Some(active.clone())));
        subscription_repo
            .expect_set_plan()
            .with(eq(local_subscription_id), eq(pro_id))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .with(eq(pro_id))
            .returning(|id| Ok(Some(plan(id, "pro", 1900, Some("price_pro_m")))));

        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo
            .expect_set_plan()
            .with(eq(organization_id), eq("pro"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_change_subscription_price()
            .withf(|_, subscription, price, proration| {
                subscription == "sub_1"
                    && price == "price_pro_m"
                    && *proration == ProrationBehavior::AlwaysInvoice
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let usecase = build(organization_repo, plan_repo, subscription_repo, gateway);

        let response = usecase
            .switch_plan(organization_id, pro_id, BillingInterval::Monthly)
            .await
            .unwrap();

        assert_eq!(
            response,
            SwitchPlanResponse {
                plan: "pro".to_string(),
                upgraded: true,
            }
        );
    }

    #[tokio::test]
    async fn downgrade_switches_without_proration() {
        let organization_id = Uuid::new_v4();
        let pro = plan(Uuid::new_v4(), "pro", 1900, Some("price_pro_m"));
        let active = active_on(organization_id, pro);

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_active_for_organization()
            .returning(move |_| Ok(Some(active.clone())));
        subscription_repo.expect_set_plan().returning(|_, _| Ok(()));

        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(plan(id, "starter", 900, Some("price_starter_m")))));

        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo.expect_set_plan().returning(|_, _| Ok(()));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_change_subscription_price()
            .withf(|_, _, _, proration| *proration == ProrationBehavior::None)
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let usecase = build(organization_repo, plan_repo, subscription_repo, gateway);

        let response = usecase
            .switch_plan(organization_id, Uuid::new_v4(), BillingInterval::Monthly)
            .await
            .unwrap();

        assert!(!response.upgraded);
        assert_eq!(response.plan, "starter");
    }

    #[tokio::test]
    async fn portal_requires_a_billing_account() {
        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(organization(id, None))));
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_portal_session().never();

        let usecase = build(
            organization_repo,
            MockPlanRepository::new(),
            MockSubscriptionRepository::new(),
            gateway,
        );

        let result = usecase.open_billing_portal(Uuid::new_v4()).await;

        assert!(matches!(result, Err(BillingError::NoBillingCustomer)));
    }

    #[tokio::test]
    async fn current_billing_reports_trial_and_subscription() {
        let organization_id = Uuid::new_v4();
        let pro = plan(Uuid::new_v4(), "pro", 1900, Some("price_pro_m"));
        let active = active_on(organization_id, pro);

        let mut organization_repo = MockOrganizationRepository::new();
        organization_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(organization(id, Some("cus_1")))));
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_active_for_organization()
            .returning(move |_| Ok(Some(active.clone())));

        let usecase = build(
            organization_repo,
            MockPlanRepository::new(),
            subscription_repo,
            MockPaymentGateway::new(),
        );

        let billing = usecase.current_billing(organization_id).await.unwrap();

        assert_eq!(billing.plan, "pro");
        assert!(billing.has_billing_account);
        assert!(billing.trial_ends_at.is_some());
        let subscription = billing.subscription.unwrap();
        assert_eq!(subscription.plan_slug, "pro");
        assert_eq!(subscription.status.as_str(), "active");
    }
}
