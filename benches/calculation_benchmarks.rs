//! Performance benchmarks for the payroll engine.
//!
//! This benchmark suite covers:
//! - The pure salary breakdown for a month of daily piecework
//! - Leave-day counting over many approved requests
//! - A full salary calculation through the service and in-memory store
//! - Scaling of the breakdown with the number of piecework entries
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use survey_payroll::calculation::{SalaryInputs, calculate_salary_breakdown, count_leave_days_in_month};
use survey_payroll::config::{ConfigLoader, PayrollConfig};
use survey_payroll::models::{
    LeaveKind, LeaveRequest, LeaveStatus, Month, PieceworkEntry, RejectionAdjustment,
    SurveyCategory,
};
use survey_payroll::service::{NewEmployee, PayrollService};
use survey_payroll::storage::InMemoryStore;

fn january() -> Month {
    Month::new(2024, 1).unwrap()
}

/// One entry per category per day, cycling through the month.
fn create_piecework(count: usize) -> Vec<PieceworkEntry> {
    let month = january();
    (0..count)
        .map(|i| PieceworkEntry {
            id: i as u64,
            user_id: 1,
            date: month.first_day() + Days::new((i / SurveyCategory::ALL.len()) as u64 % 31),
            category: SurveyCategory::ALL[i % SurveyCategory::ALL.len()],
            units_completed: (i % 17) as u32 + 1,
        })
        .collect()
}

fn create_rejections() -> Vec<RejectionAdjustment> {
    SurveyCategory::ALL
        .iter()
        .map(|&category| RejectionAdjustment {
            user_id: 1,
            month: january(),
            category,
            units_rejected: 2,
            recorded_by: 99,
        })
        .collect()
}

fn create_leave(count: usize) -> Vec<LeaveRequest> {
    let start = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
    (0..count)
        .map(|i| {
            let start_date = start + Days::new((i * 3) as u64 % 120);
            LeaveRequest {
                id: i as u64,
                user_id: 1,
                leave_kind: LeaveKind::Vacation,
                start_date,
                end_date: start_date + Days::new(2),
                reason: "bench".to_string(),
                status: LeaveStatus::Approved,
                decided_by: Some(99),
                created_at: Utc::now(),
            }
        })
        .collect()
}

fn bench_salary_breakdown(c: &mut Criterion) {
    let config = PayrollConfig::standard();
    let piecework = create_piecework(124);
    let rejections = create_rejections();
    let leave = create_leave(4);

    c.bench_function("salary_breakdown_month", |b| {
        b.iter(|| {
            let inputs = SalaryInputs {
                month: january(),
                piecework: black_box(&piecework),
                rejections: black_box(&rejections),
                approved_leave: black_box(&leave),
            };
            calculate_salary_breakdown(inputs, &config).unwrap()
        })
    });
}

fn bench_leave_days(c: &mut Criterion) {
    let leave = create_leave(1000);

    let mut group = c.benchmark_group("leave_days");
    group.throughput(Throughput::Elements(leave.len() as u64));
    group.bench_function("count_1000_requests", |b| {
        b.iter(|| count_leave_days_in_month(black_box(&leave), january(), 1))
    });
    group.finish();
}

fn bench_service_calculation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let service = PayrollService::new(Arc::new(InMemoryStore::new()), ConfigLoader::standard());
    let user_id = rt.block_on(async {
        let employee = service
            .create_employee(NewEmployee {
                username: "bench".to_string(),
                full_name: "Bench Mark".to_string(),
                email: "bench@example.com".to_string(),
                role: Default::default(),
                department: None,
                leave_balance: None,
            })
            .await
            .unwrap();
        for entry in create_piecework(124) {
            service
                .submit_piecework(
                    employee.id,
                    entry.category,
                    i64::from(entry.units_completed),
                    entry.date,
                )
                .await
                .unwrap();
        }
        employee.id
    });

    c.bench_function("service_calculate_salary", |b| {
        b.to_async(&rt).iter(|| async {
            service
                .calculate_salary(black_box(user_id), january(), 99)
                .await
                .unwrap()
        })
    });
}

fn bench_scaling(c: &mut Criterion) {
    let config = PayrollConfig::standard();
    let mut group = c.benchmark_group("breakdown_scaling");

    for count in [10usize, 100, 1000, 10000] {
        let piecework = create_piecework(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &piecework, |b, piecework| {
            b.iter(|| {
                let inputs = SalaryInputs {
                    month: january(),
                    piecework,
                    rejections: &[],
                    approved_leave: &[],
                };
                calculate_salary_breakdown(inputs, &config).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_salary_breakdown,
    bench_leave_days,
    bench_service_calculation,
    bench_scaling
);
criterion_main!(benches);
