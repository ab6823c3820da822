//! Minimal W3C WebDriver client over `reqwest`.
//!
//! Only the commands the browser backend needs are implemented: new
//! session, navigate, find element(s), click, text, attribute and delete
//! session. Any chromedriver / geckodriver / Selenium grid endpoint works.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use waktu_core::ZoneEntry;

use super::{BrowserLauncher, BrowserSession};
use crate::error::BrowserError;

/// Key under which W3C drivers return element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const CHROME_ARGS: &[&str] = &[
    "--headless=new",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--window-size=1920,1080",
    "--disable-extensions",
];

/// Starts one headless Chrome session per [`BrowserLauncher::launch`] call.
pub struct WebDriverLauncher {
    client: Client,
    endpoint: String,
    user_agent: String,
    page_load_timeout: Duration,
}

impl WebDriverLauncher {
    /// # Errors
    ///
    /// Returns [`BrowserError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        endpoint: &str,
        user_agent: &str,
        page_load_timeout: Duration,
    ) -> Result<Self, BrowserError> {
        // Page loads are bounded by the driver; leave headroom on the HTTP side.
        let client = Client::builder()
            .timeout(page_load_timeout + Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            page_load_timeout,
        })
    }

    fn capabilities(&self) -> Value {
        let mut args: Vec<String> = CHROME_ARGS.iter().map(|a| (*a).to_string()).collect();
        args.push(format!("--user-agent={}", self.user_agent));
        let page_load_ms = u64::try_from(self.page_load_timeout.as_millis()).unwrap_or(u64::MAX);

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args },
                    "timeouts": { "pageLoad": page_load_ms, "implicit": 0 }
                }
            }
        })
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let url = format!("{}/session", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&self.capabilities())
            .send()
            .await?;
        let value = unwrap_value(response).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| BrowserError::InvalidResponse("new session without sessionId".into()))?
            .to_string();
        tracing::debug!(session_id = %session_id, "webdriver session started");

        Ok(Box::new(WebDriverSession {
            client: self.client.clone(),
            session_url: format!("{}/session/{session_id}", self.endpoint),
        }))
    }
}

/// One live WebDriver session.
pub struct WebDriverSession {
    client: Client,
    session_url: String,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, BrowserError> {
        let url = format!("{}{path}", self.session_url);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        unwrap_value(response).await
    }

    async fn find_element(&self, css: &str) -> Result<String, BrowserError> {
        let value = self
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        element_id(&value)
    }

    async fn find_elements(&self, css: &str) -> Result<Vec<String>, BrowserError> {
        let value = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        element_ids(&value)
    }

    async fn find_child_elements(&self, parent: &str, css: &str) -> Result<Vec<String>, BrowserError> {
        let value = self
            .command(
                Method::POST,
                &format!("/element/{parent}/elements"),
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        element_ids(&value)
    }

    async fn element_text(&self, element: &str) -> Result<String, BrowserError> {
        let value = self
            .command(Method::GET, &format!("/element/{element}/text"), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn element_attribute(&self, element: &str, name: &str) -> Result<String, BrowserError> {
        let value = self
            .command(
                Method::GET,
                &format!("/element/{element}/attribute/{name}"),
                None,
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn select_option(&self, select_id: &str, value: &str) -> Result<(), BrowserError> {
        let option = self
            .find_element(&format!("#{select_id} option[value=\"{value}\"]"))
            .await?;
        self.command(
            Method::POST,
            &format!("/element/{option}/click"),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn texts(&self, css: &str) -> Result<Vec<String>, BrowserError> {
        let mut out = Vec::new();
        for element in self.find_elements(css).await? {
            out.push(self.element_text(&element).await?);
        }
        Ok(out)
    }

    async fn text_by_id(&self, id: &str) -> Result<String, BrowserError> {
        let element = self.find_element(&format!("#{id}")).await?;
        self.element_text(&element).await
    }

    async fn zone_options(&self, select_id: &str) -> Result<Vec<ZoneEntry>, BrowserError> {
        let mut zones = Vec::new();
        for group in self.find_elements(&format!("#{select_id} optgroup")).await? {
            let state = self.element_attribute(&group, "label").await?;
            let state = state.trim();
            if state.is_empty() {
                continue;
            }

            for option in self.find_child_elements(&group, "option").await? {
                let code = self.element_attribute(&option, "value").await?;
                let description = self.element_text(&option).await?;
                let (code, description) = (code.trim(), description.trim());
                if code.is_empty() || description.is_empty() {
                    continue;
                }
                zones.push(ZoneEntry {
                    code: code.to_uppercase(),
                    state: state.to_string(),
                    description: description.to_string(),
                });
            }
        }
        Ok(zones)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let response = self.client.delete(&self.session_url).send().await?;
        unwrap_value(response).await?;
        Ok(())
    }
}

/// Extracts the `value` member of a WebDriver response, mapping W3C error
/// payloads onto [`BrowserError`].
async fn unwrap_value(response: reqwest::Response) -> Result<Value, BrowserError> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| BrowserError::InvalidResponse(format!("HTTP {status}: {e}")))?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Err(match error.as_str() {
        "no such element" => BrowserError::NoSuchElement(message),
        "stale element reference" => BrowserError::StaleElement(message),
        _ => BrowserError::WebDriver { error, message },
    })
}

fn element_id(value: &Value) -> Result<String, BrowserError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BrowserError::InvalidResponse(format!("not an element reference: {value}")))
}

fn element_ids(value: &Value) -> Result<Vec<String>, BrowserError> {
    value
        .as_array()
        .ok_or_else(|| BrowserError::InvalidResponse(format!("not an element list: {value}")))?
        .iter()
        .map(element_id)
        .collect()
}
