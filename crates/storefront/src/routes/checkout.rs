//! Checkout route handlers.
//!
//! The cart page is served twice: rendered as HTML for browsers and as JSON
//! for headless clients. Both answer with the context token so clients can
//! send it back on later requests.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{AppendHeaders, IntoResponse},
};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{CONTEXT_TOKEN_HEADER, StorefrontContext};
use crate::pages::{CheckoutCartPage, PageRequest};
use crate::state::AppState;

/// Line item display data for templates.
#[derive(Clone)]
pub struct LineItemView {
    pub label: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
}

/// Payment or shipping option display data for templates.
#[derive(Clone)]
pub struct OptionView {
    pub name: String,
    pub description: Option<String>,
    /// Shipping cost; `None` for payment methods.
    pub price: Option<String>,
}

/// Country display data for templates.
#[derive(Clone)]
pub struct CountryView {
    pub iso: String,
    pub name: String,
}

/// Cart page display data for templates.
#[derive(Clone)]
pub struct CartPageView {
    pub title: String,
    pub robots: String,
    pub sales_channel_name: String,
    pub items: Vec<LineItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub total: String,
    pub errors: Vec<String>,
    pub countries: Vec<CountryView>,
    pub payment_methods: Vec<OptionView>,
    pub shipping_methods: Vec<OptionView>,
}

impl From<&CheckoutCartPage> for CartPageView {
    fn from(page: &CheckoutCartPage) -> Self {
        let cart = &page.cart;
        Self {
            title: page.page.meta.title.clone(),
            robots: page.page.meta.robots.clone(),
            sales_channel_name: page.page.header.sales_channel_name.clone(),
            items: cart
                .line_items
                .iter()
                .map(|item| LineItemView {
                    label: item.label.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.display(),
                    total_price: item.total_price.display(),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal: cart.price.position_price.display(),
            total: cart.price.total_price.display(),
            errors: cart.errors.clone(),
            countries: page
                .shipping_countries
                .iter()
                .map(|country| CountryView {
                    iso: country.iso.clone(),
                    name: country.name.clone(),
                })
                .collect(),
            payment_methods: page
                .payment_methods
                .iter()
                .map(|method| OptionView {
                    name: method.name.clone(),
                    description: method.description.clone(),
                    price: None,
                })
                .collect(),
            shipping_methods: page
                .shipping_methods
                .iter()
                .map(|method| OptionView {
                    name: method.name.clone(),
                    description: method.delivery_time.clone(),
                    price: Some(method.price.display()),
                })
                .collect(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/cart.html")]
pub struct CheckoutCartTemplate {
    pub view: CartPageView,
}

/// Load the cart page for the request's context.
async fn load_page(
    state: &AppState,
    StorefrontContext(mut context): StorefrontContext,
    request: PageRequest,
) -> Result<(String, CheckoutCartPage)> {
    let page = state.checkout_cart().load(&request, &mut context).await?;
    Ok((context.token().to_string(), page))
}

/// Display the checkout cart page.
#[instrument(skip_all)]
pub async fn cart_page(
    State(state): State<AppState>,
    context: StorefrontContext,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let (token, page) =
        load_page(&state, context, PageRequest::new(method, uri, headers)).await?;

    add_breadcrumb("checkout", "Viewed cart page", None);

    Ok((
        AppendHeaders([(CONTEXT_TOKEN_HEADER, token)]),
        CheckoutCartTemplate {
            view: CartPageView::from(&page),
        },
    ))
}

/// Return the checkout cart page as JSON.
#[instrument(skip_all)]
pub async fn cart_page_json(
    State(state): State<AppState>,
    context: StorefrontContext,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let (token, page) =
        load_page(&state, context, PageRequest::new(method, uri, headers)).await?;

    Ok((AppendHeaders([(CONTEXT_TOKEN_HEADER, token)]), Json(page)))
}
