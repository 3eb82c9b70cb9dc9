//! Placement eligibility state machine.
//!
//! Transitions take both affected records and return both updated, so the
//! caller can persist them as a single unit. The request and the student
//! profile must never disagree about the placement status; no transition here
//! mutates one without the other.

use chrono::{DateTime, Utc};

use super::domain::{
    PlacementError, PlacementRequest, PlacementStatus, ProfileApprovalStatus, RequestId,
    RequestStatus, StudentRecord, TrainerId,
};

/// `not_requested -> pending`, trainer-initiated.
///
/// The trainer must own the student, the profile must be admin-approved, the
/// student must not already be approved or placed, and no pending request may
/// exist. The request snapshots the aggregate score at creation time.
pub(crate) fn request_placement(
    mut student: StudentRecord,
    trainer: &TrainerId,
    request_id: RequestId,
    has_pending: bool,
    now: DateTime<Utc>,
) -> Result<(StudentRecord, PlacementRequest), PlacementError> {
    if &student.trainer != trainer {
        return Err(PlacementError::InvalidState(format!(
            "student {} is not owned by trainer {}",
            student.id.0, trainer.0
        )));
    }
    if student.profile_approval != ProfileApprovalStatus::Approved {
        return Err(PlacementError::InvalidState(format!(
            "student {} profile is not approved",
            student.id.0
        )));
    }
    if matches!(
        student.placement_status,
        PlacementStatus::Approved | PlacementStatus::Placed
    ) {
        return Err(PlacementError::InvalidState(format!(
            "student {} is already {}",
            student.id.0,
            student.placement_status.label()
        )));
    }
    if has_pending || student.placement_status == PlacementStatus::Pending {
        return Err(PlacementError::Conflict(format!(
            "student {} already has a pending placement request",
            student.id.0
        )));
    }

    let request = PlacementRequest {
        id: request_id,
        student: student.id.clone(),
        trainer: trainer.clone(),
        avg_score: student.aggregate_score,
        status: RequestStatus::Pending,
        admin_remarks: None,
        created_at: now,
        reviewed_at: None,
    };

    student.placement_admin_remarks = None;
    student.placement_reviewed_at = None;
    student.set_placement_status(PlacementStatus::Pending);

    Ok((student, request))
}

/// `pending -> approved`, coordinator action.
pub(crate) fn approve_request(
    request: PlacementRequest,
    student: StudentRecord,
    remarks: Option<String>,
    now: DateTime<Utc>,
) -> Result<(PlacementRequest, StudentRecord), PlacementError> {
    review_request(
        request,
        student,
        RequestStatus::Approved,
        PlacementStatus::Approved,
        remarks,
        now,
    )
}

/// `pending -> rejected`, coordinator action.
pub(crate) fn reject_request(
    request: PlacementRequest,
    student: StudentRecord,
    remarks: Option<String>,
    now: DateTime<Utc>,
) -> Result<(PlacementRequest, StudentRecord), PlacementError> {
    review_request(
        request,
        student,
        RequestStatus::Rejected,
        PlacementStatus::Rejected,
        remarks,
        now,
    )
}

fn review_request(
    mut request: PlacementRequest,
    mut student: StudentRecord,
    verdict: RequestStatus,
    resulting_status: PlacementStatus,
    remarks: Option<String>,
    now: DateTime<Utc>,
) -> Result<(PlacementRequest, StudentRecord), PlacementError> {
    if request.status != RequestStatus::Pending {
        return Err(PlacementError::InvalidState(format!(
            "request {} has already been {}",
            request.id.0,
            request.status.label()
        )));
    }
    if request.student != student.id {
        return Err(PlacementError::InvalidState(format!(
            "request {} does not belong to student {}",
            request.id.0, student.id.0
        )));
    }

    request.status = verdict;
    request.admin_remarks = remarks.clone();
    request.reviewed_at = Some(now);

    student.placement_admin_remarks = remarks;
    student.placement_reviewed_at = Some(now);
    student.set_placement_status(resulting_status);

    Ok((request, student))
}

/// `pending -> not_requested`, trainer cancellation. The request is deleted;
/// the student's eligibility fields reset to their defaults.
pub(crate) fn cancel_request(
    request: &PlacementRequest,
    mut student: StudentRecord,
    trainer: &TrainerId,
) -> Result<StudentRecord, PlacementError> {
    if request.status != RequestStatus::Pending {
        return Err(PlacementError::InvalidState(format!(
            "request {} is not pending and cannot be cancelled",
            request.id.0
        )));
    }
    if &request.trainer != trainer {
        return Err(PlacementError::InvalidState(format!(
            "request {} was not created by trainer {}",
            request.id.0, trainer.0
        )));
    }
    if request.student != student.id {
        return Err(PlacementError::InvalidState(format!(
            "request {} does not belong to student {}",
            request.id.0, student.id.0
        )));
    }

    student.placement_admin_remarks = None;
    student.placement_reviewed_at = None;
    student.set_placement_status(PlacementStatus::NotRequested);

    Ok(student)
}

/// `approved -> placed`, terminal admin-recorded outcome.
pub(crate) fn mark_placed(mut student: StudentRecord) -> Result<StudentRecord, PlacementError> {
    if student.placement_status != PlacementStatus::Approved {
        return Err(PlacementError::InvalidState(format!(
            "student {} is {} and cannot be marked placed",
            student.id.0,
            student.placement_status.label()
        )));
    }
    student.set_placement_status(PlacementStatus::Placed);
    Ok(student)
}

/// `approved -> removed`, terminal admin-recorded withdrawal.
pub(crate) fn mark_removed(mut student: StudentRecord) -> Result<StudentRecord, PlacementError> {
    if student.placement_status != PlacementStatus::Approved {
        return Err(PlacementError::InvalidState(format!(
            "student {} is {} and cannot be removed from placement",
            student.id.0,
            student.placement_status.label()
        )));
    }
    student.set_placement_status(PlacementStatus::Removed);
    Ok(student)
}
