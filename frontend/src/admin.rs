//! 管理端表单模块
//!
//! 课程 / 测验 / 题目编辑表单的字段模型与校验。表单字段一律为
//! `String`（直接绑定输入框），`validate` 成功后才转换成类型化的
//! 请求载荷。校验只拦住明显无效的提交，业务规则仍由服务端把关。

use learnhub_shared::ContentType;
use learnhub_shared::protocol::{
    AddContentItemRequest, AddQuestionRequest, CreateCourseRequest, CreateQuizRequest,
    UpdateCourseRequest, UpdateQuizRequest,
};

/// 题目固定为四个选项
pub const OPTION_COUNT: usize = 4;

// =========================================================
// 课程表单
// =========================================================

#[derive(Clone, Default)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_premium: bool,
}

impl CourseForm {
    pub fn from_course(course: &learnhub_shared::Course) -> Self {
        Self {
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            is_premium: course.is_premium,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Course title is required".to_string());
        }
        Ok(())
    }

    pub fn into_create_request(self) -> Result<CreateCourseRequest, String> {
        self.validate()?;
        Ok(CreateCourseRequest {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            is_premium: self.is_premium,
        })
    }

    pub fn into_update_request(self, course_id: String) -> Result<UpdateCourseRequest, String> {
        self.validate()?;
        Ok(UpdateCourseRequest {
            course_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            is_premium: self.is_premium,
        })
    }
}

// =========================================================
// 内容单元表单
// =========================================================

#[derive(Clone)]
pub struct ContentForm {
    pub title: String,
    pub content_type: ContentType,
    pub content_url: String,
    pub is_free: bool,
}

impl Default for ContentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content_type: ContentType::Video,
            content_url: String::new(),
            is_free: false,
        }
    }
}

impl ContentForm {
    pub fn into_request(self, course_id: String) -> Result<AddContentItemRequest, String> {
        if self.title.trim().is_empty() {
            return Err("Content title is required".to_string());
        }
        // 测验单元通过 content_url 携带测验 id，其余类型为资源地址
        if self.content_url.trim().is_empty() {
            return Err("Content URL is required".to_string());
        }
        Ok(AddContentItemRequest {
            course_id,
            title: self.title.trim().to_string(),
            content_type: self.content_type,
            content_url: self.content_url.trim().to_string(),
            is_free: self.is_free,
        })
    }
}

// =========================================================
// 测验表单
// =========================================================

#[derive(Clone, Default)]
pub struct QuizForm {
    pub title: String,
    pub category: String,
    pub course_id: String,
    pub is_premium: bool,
    /// 输入框原文，校验时解析为分钟数
    pub time_limit_minutes: String,
    pub total_marks: String,
}

impl QuizForm {
    pub fn from_quiz(quiz: &learnhub_shared::Quiz) -> Self {
        Self {
            title: quiz.title.clone(),
            category: quiz.category.clone(),
            course_id: quiz.course_id.clone().unwrap_or_default(),
            is_premium: quiz.is_premium,
            time_limit_minutes: quiz
                .time_limit_minutes
                .map(|m| m.to_string())
                .unwrap_or_default(),
            total_marks: quiz.total_marks.to_string(),
        }
    }

    fn parsed_fields(&self) -> Result<(u32, u32), String> {
        if self.title.trim().is_empty() {
            return Err("Quiz title is required".to_string());
        }
        let minutes: u32 = self
            .time_limit_minutes
            .trim()
            .parse()
            .map_err(|_| "Time limit must be a whole number of minutes".to_string())?;
        if minutes == 0 {
            return Err("Time limit must be at least 1 minute".to_string());
        }
        let marks: u32 = self
            .total_marks
            .trim()
            .parse()
            .map_err(|_| "Total marks must be a whole number".to_string())?;
        Ok((minutes, marks))
    }

    pub fn into_create_request(self) -> Result<CreateQuizRequest, String> {
        let (minutes, marks) = self.parsed_fields()?;
        let course_id = self.course_id.trim();
        Ok(CreateQuizRequest {
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            course_id: (!course_id.is_empty()).then(|| course_id.to_string()),
            is_premium: self.is_premium,
            time_limit_minutes: minutes,
            total_marks: marks,
        })
    }

    pub fn into_update_request(self, quiz_id: String) -> Result<UpdateQuizRequest, String> {
        let (minutes, marks) = self.parsed_fields()?;
        Ok(UpdateQuizRequest {
            quiz_id,
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            is_premium: self.is_premium,
            time_limit_minutes: minutes,
            total_marks: marks,
        })
    }
}

// =========================================================
// 题目表单
// =========================================================

#[derive(Clone)]
pub struct QuestionForm {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: String,
    pub marks: String,
}

impl Default for QuestionForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            options: Default::default(),
            correct_answer: String::new(),
            marks: "1".to_string(),
        }
    }
}

impl QuestionForm {
    pub fn into_request(self, quiz_id: String) -> Result<AddQuestionRequest, String> {
        if self.text.trim().is_empty() {
            return Err("Question text is required".to_string());
        }
        let options: Vec<String> = self
            .options
            .iter()
            .map(|o| o.trim().to_string())
            .collect();
        if options.iter().any(|o| o.is_empty()) {
            return Err("All four options are required".to_string());
        }
        let correct = self.correct_answer.trim();
        if !options.iter().any(|o| o == correct) {
            return Err("Correct answer must match one of the options".to_string());
        }
        let marks: u32 = self
            .marks
            .trim()
            .parse()
            .map_err(|_| "Marks must be a whole number".to_string())?;
        if marks == 0 {
            return Err("Marks must be at least 1".to_string());
        }
        Ok(AddQuestionRequest {
            quiz_id,
            text: self.text.trim().to_string(),
            options,
            correct_answer: correct.to_string(),
            marks,
        })
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn question_form() -> QuestionForm {
        QuestionForm {
            text: "What does `?` do".to_string(),
            options: [
                "Propagates errors".to_string(),
                "Panics".to_string(),
                "Ignores errors".to_string(),
                "Retries".to_string(),
            ],
            correct_answer: "Propagates errors".to_string(),
            marks: "2".to_string(),
        }
    }

    #[test]
    fn question_form_builds_payload_with_path_split_off() {
        let req = question_form().into_request("q1".to_string()).unwrap();
        assert_eq!(req.quiz_id, "q1");
        assert_eq!(req.options.len(), OPTION_COUNT);
        assert_eq!(req.marks, 2);
        // quiz_id 只进路径，不进 JSON 载荷
        let body = serde_json::to_string(&req).unwrap();
        assert!(!body.contains("q1"));
        assert!(body.contains("correctAnswer"));
    }

    #[test]
    fn question_form_rejects_blank_option_and_stray_answer() {
        let mut form = question_form();
        form.options[2] = "  ".to_string();
        assert!(form.into_request("q1".to_string()).is_err());

        let mut form = question_form();
        form.correct_answer = "Something else".to_string();
        assert!(form.into_request("q1".to_string()).is_err());

        let mut form = question_form();
        form.marks = "zero".to_string();
        assert!(form.into_request("q1".to_string()).is_err());
    }

    #[test]
    fn quiz_form_parses_numeric_fields() {
        let form = QuizForm {
            title: "Ownership".to_string(),
            category: "Rust".to_string(),
            course_id: String::new(),
            is_premium: true,
            time_limit_minutes: "15".to_string(),
            total_marks: "20".to_string(),
        };
        let req = form.into_create_request().unwrap();
        assert_eq!(req.time_limit_minutes, 15);
        assert_eq!(req.total_marks, 20);
        // 空 course_id 序列化时整体省略
        assert!(req.course_id.is_none());

        let form = QuizForm {
            time_limit_minutes: "soon".to_string(),
            title: "t".to_string(),
            total_marks: "1".to_string(),
            ..Default::default()
        };
        assert!(form.into_create_request().is_err());
    }

    #[test]
    fn course_form_requires_title() {
        let form = CourseForm {
            title: "   ".to_string(),
            ..Default::default()
        };
        assert!(form.into_create_request().is_err());
    }
}
