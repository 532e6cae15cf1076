// https://resend.com/docs/api-reference/emails/send-email

pub mod models;

use reqwest::{header, Client};

use crate::models::{SendEmailRequest, SendEmailResponse};

#[derive(Debug, Clone)]
pub struct ResendOptions {
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct ResendService {
    options: ResendOptions,
}

impl ResendService {
    pub fn new(options: ResendOptions) -> Self {
        Self { options }
    }

    pub async fn send_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<SendEmailResponse, &'static str> {
        let url = "https://api.resend.com/emails";

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "Content-Type",
            "application/json"
                .parse()
                .expect("Header value should parse correctly"),
        );

        let body = SendEmailRequest {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let client = Client::new();
        let res = client
            .post(url)
            .bearer_auth(&self.options.api_key)
            .headers(headers)
            .json(&body)
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Resend error ({}): {}", status, error_body);
                    return Err("Resend returned an error");
                }

                let result = response.json::<SendEmailResponse>().await;
                match result {
                    Ok(data) => Ok(data),
                    Err(e) => {
                        eprintln!("Failed to parse Resend response: {}", e);
                        Err("Error parsing send email response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to Resend failed: {}", e);
                Err("Error sending email")
            }
        }
    }
}
