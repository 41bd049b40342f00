use super::{
  ContentListView, ContentSection, DashboardView, DonationsView, Escape, FormView, LegalView,
  PlansView, ProfileView, VerifyOtpView,
};
use crate::form::screens::{ForgotPasswordForm, ResetPasswordForm, SignInForm};
use crate::form::Route;
use crate::ui::view::View;
use crate::ui::Context;

/// Build the screen a route points at. `Route::Back` has no screen.
pub fn view_for(ctx: &Context, route: &Route) -> Option<Box<dyn View>> {
  let ctx = ctx.clone();
  let view: Box<dyn View> = match route {
    Route::Back => return None,
    Route::SignIn => Box::new(
      FormView::new(ctx, "Sign in", SignInForm::default())
        .with_hint("Sign in with your admin account.")
        .with_escape(Escape::Ignore)
        .with_link('f', "forgot password", Route::ForgotPassword)
        .with_route(Route::SignIn),
    ),
    Route::ForgotPassword => Box::new(
      FormView::new(ctx, "Forgot password", ForgotPasswordForm::default())
        .with_hint("We will email you a 6-digit code to reset your password.")
        .with_escape(Escape::Navigate(Route::SignIn))
        .with_route(Route::ForgotPassword),
    ),
    Route::VerifyOtp { email } => Box::new(VerifyOtpView::new(ctx, email.clone())),
    Route::ResetPassword { email } => Box::new(
      FormView::new(ctx, "Reset password", ResetPasswordForm::new(email.clone()))
        .with_hint(format!("Choose a new password for {} (8 to 10 characters).", email))
        .with_escape(Escape::Navigate(Route::SignIn))
        .with_route(route.clone()),
    ),
    Route::Dashboard => Box::new(DashboardView::new(ctx)),
    Route::Posts => Box::new(ContentListView::new(ctx, ContentSection::Posts)),
    Route::Stories => Box::new(ContentListView::new(ctx, ContentSection::Stories)),
    Route::Series => Box::new(ContentListView::new(ctx, ContentSection::Series)),
    Route::Donations => Box::new(DonationsView::new(ctx)),
    Route::Profile => Box::new(ProfileView::new(ctx)),
    Route::Plans => Box::new(PlansView::new(ctx)),
    Route::Legal(doc) => Box::new(LegalView::new(ctx, *doc)),
  };
  Some(view)
}

/// Screens reachable without a session
pub fn is_public(route: &Route) -> bool {
  matches!(
    route,
    Route::SignIn | Route::ForgotPassword | Route::VerifyOtp { .. } | Route::ResetPassword { .. }
  )
}
