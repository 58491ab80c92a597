// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the case workflow.
//!
//! This crate sits between a transport and the workflow. It authenticates
//! the caller, validates request DTOs, drives the [`CaseStore`], and
//! translates every lower-layer error into an [`ApiError`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod handlers;
mod request_response;
mod store;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, authenticate_stub};
pub use capabilities::compute_case_capabilities;
pub use error::{
    ApiError, AuthError, RequestError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    advance_stage, approve_cost, approve_final_cost, cancel_case, close_case, create_case,
    delete_attachment, get_case, get_case_capabilities, list_cases, redo_case, reject_cost,
    reject_final_cost, save_cost, save_final_cost, update_case, upload_attachments,
};
pub use request_response::{
    AdvanceStageRequest, AssignmentForm, AttachmentInfo, Capability, CaseCapabilities, CaseInfo,
    CaseResponse, CaseSummaryInfo, ClosingForm, CostInfo, CreateCaseRequest,
    DeleteAttachmentResponse, ExecutionForm, FileInfo, FinalCostInfo, InvestigationForm,
    ListCasesRequest, ListCasesResponse, RejectRequest, SaveCostRequest, SaveFinalCostRequest,
    SignaturePadForm, SolutionForm, UpdateCaseRequest, UploadAttachmentsRequest,
    UploadAttachmentsResponse, parse_stage,
};
pub use store::CaseStore;
