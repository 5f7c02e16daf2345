//! Shared handler state for the HTTP API.

use std::sync::Arc;

use crate::application::handlers::booking::{
    AcceptBookingHandler, CancelBookingHandler, CompleteBookingHandler, DeclineBookingHandler,
    GetBookingHandler, ListAllBookingsHandler, ListConsultantBookingsHandler,
    ListPendingBookingsHandler, ListUserBookingsHandler, RequestBookingHandler,
};
use crate::application::handlers::circle::{
    CancelJoinRequestHandler, ChangeCircleLeadHandler, CreateCircleHandler,
    DecideJoinRequestHandler, GetCircleRosterHandler, ListPendingRequestsHandler,
    RequestJoinHandler, SetCircleStatusHandler,
};
use crate::application::handlers::payment::{CapturePaymentHandler, GetPaymentHandler};
use crate::application::Notifier;
use crate::domain::payment::PriceSchedule;
use crate::ports::EntityStore;

use super::auth::JwtVerifier;

#[derive(Clone)]
pub struct BookingHandlers {
    pub request: Arc<RequestBookingHandler>,
    pub accept: Arc<AcceptBookingHandler>,
    pub decline: Arc<DeclineBookingHandler>,
    pub complete: Arc<CompleteBookingHandler>,
    pub cancel: Arc<CancelBookingHandler>,
    pub get: Arc<GetBookingHandler>,
    pub list_own: Arc<ListUserBookingsHandler>,
    pub list_pending: Arc<ListPendingBookingsHandler>,
    pub list_assigned: Arc<ListConsultantBookingsHandler>,
    pub list_all: Arc<ListAllBookingsHandler>,
    pub capture_payment: Arc<CapturePaymentHandler>,
    pub get_payment: Arc<GetPaymentHandler>,
}

#[derive(Clone)]
pub struct CircleHandlers {
    pub create: Arc<CreateCircleHandler>,
    pub set_status: Arc<SetCircleStatusHandler>,
    pub change_lead: Arc<ChangeCircleLeadHandler>,
    pub roster: Arc<GetCircleRosterHandler>,
    pub request_join: Arc<RequestJoinHandler>,
    pub decide: Arc<DecideJoinRequestHandler>,
    pub cancel_request: Arc<CancelJoinRequestHandler>,
    pub list_pending: Arc<ListPendingRequestsHandler>,
}

/// Everything the router needs: one handler per operation plus the token
/// verifier.
#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingHandlers,
    pub circles: CircleHandlers,
    pub verifier: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        notifier: Notifier,
        prices: PriceSchedule,
        verifier: JwtVerifier,
    ) -> Self {
        let bookings = BookingHandlers {
            request: Arc::new(RequestBookingHandler::new(store.clone(), notifier.clone())),
            accept: Arc::new(AcceptBookingHandler::new(store.clone(), notifier.clone())),
            decline: Arc::new(DeclineBookingHandler::new(store.clone(), notifier.clone())),
            complete: Arc::new(CompleteBookingHandler::new(store.clone(), notifier.clone())),
            cancel: Arc::new(CancelBookingHandler::new(store.clone(), notifier.clone())),
            get: Arc::new(GetBookingHandler::new(store.clone())),
            list_own: Arc::new(ListUserBookingsHandler::new(store.clone())),
            list_pending: Arc::new(ListPendingBookingsHandler::new(store.clone())),
            list_assigned: Arc::new(ListConsultantBookingsHandler::new(store.clone())),
            list_all: Arc::new(ListAllBookingsHandler::new(store.clone())),
            capture_payment: Arc::new(CapturePaymentHandler::new(
                store.clone(),
                notifier.clone(),
                prices,
            )),
            get_payment: Arc::new(GetPaymentHandler::new(store.clone())),
        };

        let circles = CircleHandlers {
            create: Arc::new(CreateCircleHandler::new(store.clone(), notifier.clone())),
            set_status: Arc::new(SetCircleStatusHandler::new(store.clone(), notifier.clone())),
            change_lead: Arc::new(ChangeCircleLeadHandler::new(store.clone(), notifier.clone())),
            roster: Arc::new(GetCircleRosterHandler::new(store.clone())),
            request_join: Arc::new(RequestJoinHandler::new(store.clone(), notifier.clone())),
            decide: Arc::new(DecideJoinRequestHandler::new(store.clone(), notifier.clone())),
            cancel_request: Arc::new(CancelJoinRequestHandler::new(store.clone(), notifier)),
            list_pending: Arc::new(ListPendingRequestsHandler::new(store)),
        };

        Self {
            bookings,
            circles,
            verifier: Arc::new(verifier),
        }
    }
}
