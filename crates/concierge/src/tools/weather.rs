use concierge_core::tool::{Tool, ToolResult};
use reqwest::Client;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const INVALID_KEY_MESSAGE: &str =
    "Error: The OpenWeatherMap API key is invalid. Please check your .env file.";
const CONNECTION_FAILURE_MESSAGE: &str = "Error: Could not connect to the weather service.";

#[derive(Deserialize, JsonSchema)]
pub struct WeatherParameters {
    #[schemars(description = "The city to fetch the current weather for.")]
    city: String,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    main: MainSection,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

/// A tool for fetching the current weather of a city.
///
/// Every failure mode is reported as a readable message in the tool's
/// output rather than as an error, so the model can relay the problem
/// to the user instead of retrying blindly.
pub struct WeatherTool {
    client: Client,
    api_key: String,
    parameter_schema: Value,
}

impl WeatherTool {
    /// Creates a new weather tool.
    #[inline]
    pub fn new(client: Client, api_key: String) -> Self {
        WeatherTool {
            client,
            api_key,
            parameter_schema: schema_for!(WeatherParameters).to_value(),
        }
    }
}

impl Tool for WeatherTool {
    type Input = WeatherParameters;

    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Fetches the current weather for a specified city. Use this for \
         any questions about weather."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WeatherParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        async move {
            let city = input.city;
            debug!("fetching weather for {city}");
            let resp = match client
                .get(WEATHER_URL)
                .query(&[
                    ("q", city.as_str()),
                    ("appid", api_key.as_str()),
                    ("units", "imperial"),
                ])
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    warn!("weather request failed: {err}");
                    return Ok(CONNECTION_FAILURE_MESSAGE.to_owned());
                }
            };
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Ok(describe_weather_response(&city, status, &body))
        }
    }
}

/// Maps one provider response to the text fed back to the model.
fn describe_weather_response(city: &str, status: u16, body: &str) -> String {
    if status == 401 {
        return INVALID_KEY_MESSAGE.to_owned();
    }
    if !(200..300).contains(&status) {
        return city_not_found_message(city);
    }
    let Ok(payload) = serde_json::from_str::<WeatherResponse>(body) else {
        return city_not_found_message(city);
    };
    let Some(condition) = payload.weather.first() else {
        return city_not_found_message(city);
    };
    format!(
        "The current weather in {} is {}\u{b0}F with {}.",
        payload.name, payload.main.temp, condition.description
    )
}

fn city_not_found_message(city: &str) -> String {
    format!("Error: Could not find weather data for {city}. Please check the city name.")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAPA_BODY: &str = r#"{
        "name": "Napa",
        "main": { "temp": 72.5, "humidity": 40 },
        "weather": [{ "description": "clear sky" }]
    }"#;

    #[test]
    fn test_successful_lookup() {
        let message = describe_weather_response("Napa", 200, NAPA_BODY);
        assert_eq!(
            message,
            "The current weather in Napa is 72.5\u{b0}F with clear sky."
        );
    }

    #[test]
    fn test_invalid_api_key() {
        let message = describe_weather_response("Napa", 401, r#"{"cod":401}"#);
        assert_eq!(
            message,
            "Error: The OpenWeatherMap API key is invalid. Please check your .env file."
        );
    }

    #[test]
    fn test_unknown_city() {
        let message = describe_weather_response("Atlantis", 404, r#"{"cod":"404"}"#);
        assert_eq!(
            message,
            "Error: Could not find weather data for Atlantis. Please check the city name."
        );
    }

    #[test]
    fn test_missing_fields_count_as_not_found() {
        let message = describe_weather_response("Napa", 200, r#"{"name":"Napa"}"#);
        assert!(message.starts_with("Error: Could not find weather data for Napa"));
    }

    #[test]
    fn test_empty_conditions_count_as_not_found() {
        let body = r#"{"name":"Napa","main":{"temp":72.5},"weather":[]}"#;
        let message = describe_weather_response("Napa", 200, body);
        assert!(message.starts_with("Error: Could not find weather data for Napa"));
    }
}
