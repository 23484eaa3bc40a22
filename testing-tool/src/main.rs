use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use colored::*;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const API_PREFIX: &str = "/api/v1";

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🚌 Transit Tracking Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = prompt(&format!("URL del servidor [{}]: ", DEFAULT_BASE_URL))?;
    let base_url = if base_url.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else {
        base_url.trim_end_matches('/').to_string()
    };
    let client = Client::new();

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 💓 Health check");
        println!("2. 🚀 Flujo completo (conductor → sesión → coordenadas)");
        println!("3. 🧪 Casos de error");
        println!("4. 🚪 Salir");

        match prompt("Selecciona una opción (1-4): ")?.as_str() {
            "1" => report(check_health(&client, &base_url).await),
            "2" => report(run_full_flow(&client, &base_url).await),
            "3" => report(run_error_cases(&client, &base_url).await),
            "4" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn report(result: Result<()>) {
    match result {
        Ok(()) => println!("{}", "✅ Prueba completada".bright_green().bold()),
        Err(e) => println!("{} {:#}", "❌ Prueba fallida:".bright_red().bold(), e),
    }
}

/// Envía la petición y exige el código esperado
async fn call(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    expected: StatusCode,
) -> Result<Value> {
    let mut request = client.request(method.clone(), url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.with_context(|| format!("{} {}", method, url))?;
    let status = response.status();
    let text = response.text().await?;
    println!("{} {} {} -> {}", "📤".bright_blue(), method, url, status);

    if status != expected {
        bail!("se esperaba {} y llegó {}: {}", expected, status, text);
    }
    if text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

async fn check_health(client: &Client, base_url: &str) -> Result<()> {
    let body = call(client, Method::GET, &format!("{}/health", base_url), None, StatusCode::OK).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if body["status"] != "healthy" {
        bail!("la base de datos no responde: {}", body["database"]);
    }
    Ok(())
}

fn unique_phone() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("+346{:08}", nanos % 100_000_000)
}

fn driver_payload(phone: &str) -> Value {
    json!({
        "name": "Smoke Test Driver",
        "contact_info": {
            "phone": phone,
            "email": "smoke@example.com",
            "address": "Calle de Prueba 1, Madrid"
        },
        "vehicle_details": {
            "type": "bus",
            "make": "Irizar",
            "model": "ie tram",
            "year": 2022,
            "plate_number": "TEST-001"
        }
    })
}

async fn run_full_flow(client: &Client, base_url: &str) -> Result<()> {
    let api = format!("{}{}", base_url, API_PREFIX);

    println!();
    println!("{}", "👤 Registrando conductor".bright_cyan().bold());
    let driver = call(
        client,
        Method::POST,
        &format!("{}/drivers", api),
        Some(driver_payload(&unique_phone())),
        StatusCode::CREATED,
    )
    .await?;
    let driver_id = driver["driver_id"].as_i64().context("driver_id ausente")?;
    println!("   driver_id = {}", driver_id);

    println!("{}", "🟢 Iniciando sesión (dos veces)".bright_cyan().bold());
    let start = json!({ "driver_id": driver_id });
    let first = call(client, Method::POST, &format!("{}/sessions/start", api), Some(start.clone()), StatusCode::OK).await?;
    let second = call(client, Method::POST, &format!("{}/sessions/start", api), Some(start), StatusCode::OK).await?;
    if first["session_id"] != second["session_id"] {
        bail!("el inicio de sesión no es idempotente");
    }
    let session_id = first["session_id"].as_i64().context("session_id ausente")?;

    println!("{}", "📍 Enviando lote de coordenadas".bright_cyan().bold());
    let batch: Vec<Value> = (0..3)
        .map(|i| {
            json!({
                "session_id": session_id,
                "latitude": 40.4168 + i as f64 * 0.001,
                "longitude": -3.7038,
                "speed": 30.0 + i as f64
            })
        })
        .collect();
    let created = call(client, Method::POST, &format!("{}/coordinates/batch", api), Some(json!(batch)), StatusCode::OK).await?;
    println!("   {} coordenadas creadas", created.as_array().map_or(0, Vec::len));

    let listed = call(
        client,
        Method::GET,
        &format!("{}/coordinates/session/{}", api, session_id),
        None,
        StatusCode::OK,
    )
    .await?;
    if listed.as_array().map_or(0, Vec::len) != 3 {
        bail!("se esperaban 3 coordenadas: {}", listed);
    }

    println!("{}", "🏁 Finalizando sesión".bright_cyan().bold());
    let ended = call(
        client,
        Method::POST,
        &format!("{}/sessions/{}/end", api, session_id),
        Some(json!({ "total_distance_km": 2.4 })),
        StatusCode::OK,
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&ended)?);

    println!("{}", "🗑️ Desactivando conductor".bright_cyan().bold());
    call(client, Method::DELETE, &format!("{}/drivers/{}", api, driver_id), None, StatusCode::NO_CONTENT).await?;

    Ok(())
}

async fn run_error_cases(client: &Client, base_url: &str) -> Result<()> {
    let api = format!("{}{}", base_url, API_PREFIX);

    println!();
    println!("{}", "🧪 Lote vacío".bright_cyan().bold());
    call(client, Method::POST, &format!("{}/coordinates/batch", api), Some(json!([])), StatusCode::BAD_REQUEST).await?;

    println!("{}", "🧪 Conductor inexistente".bright_cyan().bold());
    call(
        client,
        Method::POST,
        &format!("{}/sessions/start", api),
        Some(json!({ "driver_id": i32::MAX })),
        StatusCode::NOT_FOUND,
    )
    .await?;

    println!("{}", "🧪 Filtro de estado inválido".bright_cyan().bold());
    call(
        client,
        Method::GET,
        &format!("{}/sessions/driver/1?status=paused", api),
        None,
        StatusCode::BAD_REQUEST,
    )
    .await?;

    println!("{}", "🧪 Teléfono duplicado".bright_cyan().bold());
    let phone = unique_phone();
    call(client, Method::POST, &format!("{}/drivers", api), Some(driver_payload(&phone)), StatusCode::CREATED).await?;
    call(client, Method::POST, &format!("{}/drivers", api), Some(driver_payload(&phone)), StatusCode::BAD_REQUEST).await?;

    Ok(())
}
