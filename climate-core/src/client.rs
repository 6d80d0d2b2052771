use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    aggregate::{average_in_range, to_f64},
    config::Config,
    decode::decode_list,
    error::ClimateError,
    model::{ClimateDataList, QueryArgs},
    request::{CallContext, GetRequest, build_request},
    transport::{HttpResponse, Transport, truncate_body},
    validate::{RuleValidator, Validator},
};

/// Client for the annual rainfall endpoint.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ClimateClient {
    transport: Arc<dyn Transport>,
    validator: Arc<dyn Validator>,
    base_url: String,
}

impl ClimateClient {
    pub fn new(
        transport: impl Transport + 'static,
        validator: impl Validator + 'static,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            validator: Arc::new(validator),
            base_url: base_url.into(),
        }
    }

    /// Real HTTP transport and the rule validator, pointed at the configured base URL.
    pub fn from_config(config: &Config) -> Self {
        Self::new(reqwest::Client::new(), RuleValidator, config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a GET request for an absolute URL or a path under the base URL.
    pub fn build_request(
        &self,
        ctx: &CallContext,
        path_or_url: &str,
    ) -> Result<GetRequest, ClimateError> {
        build_request(ctx, &self.base_url, path_or_url)
    }

    /// Fetches and decodes the annual rainfall records for `args`.
    ///
    /// Nothing is sent if `args` fail validation. An empty result is `Ok`.
    pub async fn get_annual_rainfall(
        &self,
        ctx: &CallContext,
        args: &QueryArgs,
    ) -> Result<ClimateDataList, ClimateError> {
        self.validator.validate(args)?;

        let request = self.build_request(ctx, &args.rainfall_path())?;
        info!(url = %request.url(), "fetching annual rainfall");

        let response = self.execute(request).await?;

        if !response.status.is_success() {
            warn!(status = %response.status, "climate API request failed");
            return Err(ClimateError::Remote {
                status: response.status,
                body: truncate_body(&response.body),
            });
        }

        let list = decode_list(&response.body)?;
        debug!(points = list.len(), "decoded annual rainfall");
        Ok(list)
    }

    /// Average annual rainfall for a country over `[from_year, to_year]`.
    ///
    /// The average is computed exactly and narrowed to `f64` on return. On
    /// any failure no value is produced, so a missing dataset can never be
    /// mistaken for zero rainfall.
    pub async fn get_ave_annual_rainfall(
        &self,
        ctx: &CallContext,
        from_year: i64,
        to_year: i64,
        country_code: &str,
    ) -> Result<f64, ClimateError> {
        let args = QueryArgs::from_years(from_year, to_year, country_code);
        let list = self.get_annual_rainfall(ctx, &args).await?;
        let average = average_in_range(&list, from_year, to_year)?;
        to_f64(average)
    }

    async fn execute(&self, request: GetRequest) -> Result<HttpResponse, ClimateError> {
        let GetRequest { request, context } = request;
        let token = context.cancellation_token();

        let send = async {
            match context.timeout() {
                Some(limit) => tokio::time::timeout(limit, self.transport.send(request))
                    .await
                    .map_err(|_| anyhow::anyhow!("request timed out after {limit:?}"))?,
                None => self.transport.send(request).await,
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ClimateError::Cancelled),
            result = send => result.map_err(ClimateError::Transport),
        }
    }
}
