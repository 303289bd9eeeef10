//! Prompt text sent upstream for each endpoint.

use crate::domain::contract::AdviceRequest;
use crate::llm::ContentPart;
use serde_json::Value;
use std::borrow::Cow;

const ANALYZE_INSTRUCTION: &str = "Analyze this image and determine if it is a trading chart. \
If it is, extract the timeframe and say in plural eg. if xm you say minutes, if xh you say hours. \
if xd you say days, etc... always give answer of time frame type in plural as mentioned before.";

const ADVICE_PREAMBLE: &str = "Please analyze the provided chart image and give detailed trading advice. \
Follow the structured prompts below for a comprehensive analysis:";

pub fn analyze_parts(image_url: Option<&Value>) -> Vec<ContentPart> {
    vec![
        ContentPart::text(ANALYZE_INSTRUCTION),
        ContentPart::image(image_url.cloned()),
    ]
}

/// Preamble, the eight-section template, then the image. `timeframes` is not used.
pub fn advice_parts(req: &AdviceRequest) -> Vec<ContentPart> {
    vec![
        ContentPart::text(ADVICE_PREAMBLE),
        ContentPart::text(advice_template(req)),
        ContentPart::image(req.image_url.clone()),
    ]
}

/// Text form of a caller-supplied field. Missing and `null` render as nothing,
/// strings render unquoted, anything else renders as compact JSON.
fn render(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn advice_template(req: &AdviceRequest) -> String {
    let strategy = render(req.strategy.as_ref());
    let extracted_timeframe = render(req.extracted_timeframe.as_ref());
    let additional_parameter = render(req.additional_parameter.as_ref());
    let image_url = render(req.image_url.as_ref());

    // Section wording is kept stable; spelling and indentation are normalised.
    format!(
        "1. **Financial Product and Time Frame Extraction:**
- Extract the financial product name and the time frame from the provided chart.

2. **Strategy Evaluation:**
- Analyze the chosen strategy: {strategy}.
- Provide a judgment on whether this strategy is suitable for the identified financial product and time frame: {extracted_timeframe}.
- Include any additional considerations related to: {additional_parameter}.

3. **Trade Recommendations:**
- Based on your analysis, indicate whether to buy or sell the financial product.
- Specify recommended take profit and stop loss levels.
- Discuss the use of pips for trading and provide buy/sell recommendations in pips if applicable.
- If trading contracts are involved, include relevant details about the contracts.

4. **Technical Analysis:**
- Conduct a candlestick analysis, identifying any patterns present in the chart.
- Describe the pattern and its implications for trading decisions.

5. **Leverage and Risk Management:**
- Provide advice on the appropriate leverage to use given the current market conditions and the analyzed strategy.
- Offer comprehensive risk management advice, focusing on safe trading practices and minimizing potential losses.

6. **Market Timing:**
- Assess whether it is an optimal moment to enter the market or if it is advisable to wait.
- Justify your recommendation based on the current market conditions and chart analysis.

7. **General Market Insights:**
- Include any additional market insights or trends that could influence trading decisions.

8. **Final Advice:**
- Summarize your analysis and provide a clear and actionable recommendation based on all the factors considered.

Image URL: {image_url}

Please ensure that your analysis is thorough and provides actionable insights for effective trading decisions. Thank you."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn advice_request() -> AdviceRequest {
        AdviceRequest {
            image_url: Some(json!("https://img.example/eurusd.png")),
            strategy: Some(json!("breakout")),
            timeframes: Some(json!("1h,4h")),
            additional_parameter: Some(json!("high volatility")),
            extracted_timeframe: Some(json!("hours")),
        }
    }

    #[test]
    fn analyze_prompt_is_instruction_then_image() {
        let parts = analyze_parts(Some(&json!("https://img.example/chart.png")));
        assert_eq!(parts.len(), 2);
        let instruction = parts[0].as_text().unwrap();
        assert!(instruction.starts_with("Analyze this image and determine if it is a trading chart."));
        assert!(instruction.contains("say in plural eg. if xm you say minutes, if xh you say hours."));
        assert_eq!(parts[1], ContentPart::image(Some("https://img.example/chart.png")));
    }

    #[test]
    fn advice_template_interpolates_inputs_verbatim() {
        let parts = advice_parts(&advice_request());
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].as_text(), Some(ADVICE_PREAMBLE));

        let template = parts[1].as_text().unwrap();
        assert!(template.contains("Analyze the chosen strategy: breakout."));
        assert!(template.contains("time frame: hours."));
        assert!(template.contains("related to: high volatility."));
        assert!(template.contains("Image URL: https://img.example/eurusd.png"));
        assert!(!template.contains("1h,4h"));

        assert_eq!(parts[2], ContentPart::image(Some("https://img.example/eurusd.png")));
    }

    #[test]
    fn advice_template_has_eight_sections() {
        let template = advice_template(&advice_request());
        for n in 1..=8 {
            assert!(template.contains(&format!("\n{n}. **")) || template.starts_with("1. **"));
        }
        assert!(template.contains("8. **Final Advice:**"));
    }

    #[test]
    fn analyze_forwards_image_url_of_any_json_type() {
        let parts = analyze_parts(Some(&json!(12345)));
        assert_eq!(parts[1], ContentPart::image(json!(12345)));

        let parts = analyze_parts(None);
        assert_eq!(parts[1], ContentPart::image(Value::Null));
    }

    #[test]
    fn missing_and_null_advice_fields_render_empty() {
        let template = advice_template(&AdviceRequest::default());
        assert!(template.contains("Analyze the chosen strategy: ."));
        assert!(template.contains("time frame: ."));
        assert!(template.contains("related to: ."));
        assert!(template.contains("Image URL: \n"));

        let template = advice_template(&AdviceRequest {
            strategy: Some(Value::Null),
            ..AdviceRequest::default()
        });
        assert!(template.contains("Analyze the chosen strategy: ."));
        assert!(!template.contains("null"));
        assert!(!template.contains("undefined"));
    }

    #[test]
    fn non_string_advice_fields_render_as_json() {
        let template = advice_template(&AdviceRequest {
            strategy: Some(json!(12345)),
            additional_parameter: Some(json!(["news", "volume"])),
            ..AdviceRequest::default()
        });
        assert!(template.contains("Analyze the chosen strategy: 12345."));
        assert!(template.contains(r#"related to: ["news","volume"]."#));
    }
}
