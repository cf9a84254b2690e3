//! Subcommand execution against the client library.

use crate::table;
use crate::{HistoryArgs, PredictArgs};
use anyhow::Result;
use heartview_client::{
    filter_records, sanitize_numeric_input, HeartviewClient, PredictionInput, Query, Registration,
};
use std::io::Write;

/// Prompt on stderr and read one line from stdin.
fn prompt_password(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(client: &HeartviewClient, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password: ")?,
    };
    let session = client.login(email, &password).await?;
    println!("Signed in as {}", session.email);
    Ok(())
}

pub async fn logout(client: &HeartviewClient) -> Result<()> {
    client.logout().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn register(
    client: &HeartviewClient,
    username: String,
    email: String,
    password: Option<String>,
    gender: String,
    dob: String,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password: ")?,
    };
    let registration = Registration {
        username,
        email,
        password,
        gender,
        dob,
    };
    client.register(&registration).await?;
    println!(
        "Registration successful. A verification email has been sent. \
         Please verify your email before logging in."
    );
    Ok(())
}

pub async fn reset_request(client: &HeartviewClient, email: &str) -> Result<()> {
    client.request_password_reset(email).await?;
    println!("Password reset email sent! Check your inbox.");
    Ok(())
}

pub async fn reset_confirm(
    client: &HeartviewClient,
    code: &str,
    password: Option<String>,
) -> Result<()> {
    let email = client.verify_reset_code(code).await?;
    println!("Reset code is valid for {}.", email);

    let password = match password {
        Some(p) => p,
        None => prompt_password("New password: ")?,
    };
    client.confirm_password_reset(code, &password).await?;
    println!("Password reset successful! You can sign in with the new password.");
    Ok(())
}

pub async fn predict(client: &HeartviewClient, args: &PredictArgs) -> Result<()> {
    let input = PredictionInput {
        age: sanitize_numeric_input(&args.age),
        sex: args.gender.trim().to_uppercase(),
        chest_pain: sanitize_numeric_input(&args.cp),
        resting_bp: sanitize_numeric_input(&args.trestbps),
        cholesterol: sanitize_numeric_input(&args.chol),
        fasting_blood_sugar: sanitize_numeric_input(&args.fbs),
        resting_ecg: sanitize_numeric_input(&args.restecg),
        max_heart_rate: sanitize_numeric_input(&args.thalch),
        exercise_angina: sanitize_numeric_input(&args.exang),
        st_depression: sanitize_numeric_input(&args.oldpeak),
        st_slope: sanitize_numeric_input(&args.slope),
        vessel_count: sanitize_numeric_input(&args.ca),
        thalassemia: sanitize_numeric_input(&args.thal),
    };

    let outcome = client.predict(&input).await?;
    println!("{}", outcome.interpretation());
    println!("Stored as record {}.", outcome.id);
    Ok(())
}

pub async fn history(client: &HeartviewClient, args: &HistoryArgs) -> Result<()> {
    let records = client.history().await?;

    let mut query = Query::new(args.search.clone().unwrap_or_default());
    if let Some(column) = &args.column {
        query = query.with_column_label(column);
    }
    if args.exact {
        query = query.exact();
    }
    let visible = filter_records(&records, &query);

    if args.json {
        let owned: Vec<_> = visible.iter().map(|r| (*r).clone()).collect();
        println!("{}", serde_json::to_string_pretty(&owned)?);
    } else if visible.is_empty() {
        println!("No matching records.");
    } else {
        print!("{}", table::render(&visible));
        println!("{} of {} records.", visible.len(), records.len());
    }

    if args.delete {
        let ids: Vec<String> = visible.iter().map(|r| r.id.clone()).collect();
        if ids.is_empty() {
            return Ok(());
        }
        let outcome = client.delete_records(&ids).await?;
        println!("Deleted {} of {} records.", outcome.deleted.len(), ids.len());
        for (id, err) in &outcome.failed {
            eprintln!("Failed to delete {}: {}", id, err);
        }
    }

    Ok(())
}

pub async fn account_show(client: &HeartviewClient) -> Result<()> {
    let profile = client.profile().await?;
    println!("Username: {}", profile.username);
    println!("Email:    {}", profile.email);
    println!("Gender:   {}", profile.gender);
    println!("DOB:      {}", profile.dob);
    println!("Joined:   {}", profile.created_at);
    Ok(())
}

pub async fn account_set_username(client: &HeartviewClient, username: &str) -> Result<()> {
    client.set_username(username).await?;
    println!("Username updated.");
    Ok(())
}
