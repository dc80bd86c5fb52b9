use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long `/slow` holds its response.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

const HTML_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Herman Melville - Moby-Dick</title></head>
  <body>
    <h1>Herman Melville - Moby-Dick</h1>
    <p>Availing himself of the mild, summer-cool weather that now reigned in these latitudes.</p>
    <a href="/quotes">Quotes</a>
  </body>
</html>
"#;

const BOOKS_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>All products | Books to Scrape - Sandbox</title></head>
<body><ol class="row">
  <li><article class="product_pod">
    <p class="star-rating Three"></p>
    <h3><a href="catalogue/soumission_998/index.html" title="Soumission">Soumission</a></h3>
    <p class="price_color">£51.77</p>
    <p class="instock availability">In stock</p>
  </article></li>
  <li><article class="product_pod">
    <p class="star-rating One"></p>
    <h3><a href="catalogue/tipping-the-velvet_999/index.html" title="Tipping the Velvet">Tipping the ...</a></h3>
    <p class="price_color">£53.74</p>
    <p class="instock availability">In stock</p>
  </article></li>
</ol></body></html>
"#;

pub const QUOTES_PER_PAGE: usize = 10;
pub const POSTS_TOTAL: usize = 12;

fn quotes_page() -> String {
    let blocks: String = (1..=QUOTES_PER_PAGE)
        .map(|i| {
            format!(
                r#"<div class="quote">
  <span class="text">“Quote {i}.”</span>
  <span>by <small class="author">Author {i}</small></span>
  <div class="tags"><a class="tag" href="/tag/life/">life</a></div>
</div>
"#
            )
        })
        .collect();
    format!(
        "<!DOCTYPE html><html><head><title>Quotes to Scrape</title></head>\
         <body>{blocks}</body></html>"
    )
}

fn posts_json() -> String {
    let posts: Vec<serde_json::Value> = (1..=POSTS_TOTAL)
        .map(|id| {
            serde_json::json!({
                "userId": 1,
                "id": id,
                "title": format!("post {id}"),
                "body": "..."
            })
        })
        .collect();
    serde_json::to_string(&posts).expect("serialize posts")
}

pub struct SiteStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SiteStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start site stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().split('?').next().unwrap_or("").to_owned();
                let (status, content_type, body) = match path.as_str() {
                    "/html" => (200, "text/html; charset=utf-8", HTML_PAGE.to_owned()),
                    "/quotes" => (200, "text/html; charset=utf-8", quotes_page()),
                    "/books" => (200, "text/html; charset=utf-8", BOOKS_PAGE.to_owned()),
                    "/posts" => (200, "application/json; charset=utf-8", posts_json()),
                    "/broken-json" => (
                        200,
                        "application/json; charset=utf-8",
                        r#"{"id": 1, "title": "#.to_owned(),
                    ),
                    "/slow" => {
                        thread::spawn(move || {
                            thread::sleep(SLOW_RESPONSE);
                            let _ = request.respond(tiny_http::Response::from_string("too late"));
                        });
                        continue;
                    }
                    _ => (404, "text/plain", "not found".to_owned()),
                };

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                        .expect("build header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for SiteStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
